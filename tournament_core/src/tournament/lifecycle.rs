//! setup and the manual/Scheduled lifecycle transitions (spec.md §4.2).

use super::Tournament;
use crate::config::TournamentConfig;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{RemoteId, UserRef};
use crate::match_::Match;
use crate::participant::Participant;
use crate::phase::{EventName, SubPhase, TournamentPhase};
use crate::ports::provider::{ProviderPort, RemoteTournamentInfo};
use crate::timing::{compute_checkin_reminders, CheckinTiming, RegisterTiming, TzInstant};
use crate::top8::Top8;
use std::collections::HashSet;
use std::time::Duration;

/// statuses a remote bracket provider reports once a tournament has moved
/// past its registration/seeding stage (spec.md §4.2 `setup`,
/// "AlreadyStarted"). The provider adapter vocabulary for Challonge-shaped
/// APIs uses these two; anything else (`pending`, `awaiting_review` before
/// start) is treated as not yet started.
const ALREADY_STARTED_STATUSES: [&str; 2] = ["underway", "complete"];

/// outcome of [`Tournament::setup_or_resume`]: either a fresh draft pending
/// its register/check-in schedule, or a tournament that resumed directly
/// into `Ongoing` because the remote bracket was already underway.
pub enum SetupOutcome {
    Draft(Tournament),
    Resumed {
        tournament: Tournament,
        /// remote participants that could not be matched to a chat user and
        /// were destroyed on the remote rather than carried forward.
        unmatched: Vec<RemoteId>,
    },
}

/// derives the register/check-in windows from `tournament_start` and the
/// configured offsets (spec.md §3). Shared by `setup` (which additionally
/// validates ordering) and `persistence::from_snapshot` (which restores a
/// tournament whose windows were already validated once at setup time).
pub(crate) fn derive_timing(
    tournament_start: TzInstant,
    config: &TournamentConfig,
) -> (RegisterTiming, CheckinTiming) {
    let register = RegisterTiming {
        start: tournament_start.sub(Duration::from_secs(config.registration.opening)),
        second_start: if config.registration.second_opening > 0 {
            Some(tournament_start.sub(Duration::from_secs(config.registration.second_opening)))
        } else {
            None
        },
        stop: tournament_start.sub(Duration::from_secs(config.registration.closing)),
    };
    let checkin = CheckinTiming {
        start: tournament_start.sub(Duration::from_secs(config.checkin.opening)),
        stop: tournament_start.sub(Duration::from_secs(config.checkin.closing)),
    };
    (register, checkin)
}

impl Tournament {
    /// builds a new, still-`Pending` tournament from remote info and a
    /// configuration, deriving the register/check-in windows from
    /// `tournament_start` and validating their ordering.
    ///
    /// Returns [`EngineError::ConflictingDates`] naming every pair of
    /// offsets that would put a later event before an earlier one.
    pub fn setup(
        remote_id: RemoteId,
        name: String,
        game: String,
        url: String,
        limit: Option<u32>,
        tournament_start: TzInstant,
        config: TournamentConfig,
        config_name: String,
    ) -> EngineResult<Self> {
        let (register, checkin) = derive_timing(tournament_start, &config);

        let mut offenders = Vec::new();
        if config.registration.opening > 0 && config.registration.closing > 0 {
            if register.start.is_after(register.stop) {
                offenders.push("register_start > register_stop".to_string());
            }
        }
        if let Some(second) = register.second_start {
            if second.is_before(register.start) || second.is_after(register.stop) {
                offenders.push("register_second_start outside [register_start, register_stop]".to_string());
            }
        }
        if config.checkin.opening > 0 && config.checkin.closing > 0 {
            if checkin.start.is_after(checkin.stop) {
                offenders.push("checkin_start > checkin_stop".to_string());
            }
        }
        if config.registration.closing > 0 && config.checkin.opening > 0 {
            if checkin.start.is_before(register.stop) {
                offenders.push("checkin_start before register_stop".to_string());
            }
        }
        if !offenders.is_empty() {
            return Err(EngineError::ConflictingDates { offenders });
        }

        // a check-in window under a minute can't usefully run its own
        // close event: fold it into `ignored_events` rather than reject the
        // setup outright (spec.md §8 "Boundary").
        let mut ignored_events = HashSet::new();
        if config.checkin.opening > 0
            && config.checkin.closing > 0
            && checkin.stop.epoch_seconds() - checkin.start.epoch_seconds() < 60
        {
            ignored_events.insert(EventName::CheckinStop);
        }

        Ok(Self {
            remote_id,
            name,
            game,
            url,
            limit,
            tournament_start,
            config,
            config_name,
            phase: TournamentPhase::Pending,
            register_phase: SubPhase::Manual,
            checkin_phase: SubPhase::Manual,
            ignored_events,
            register,
            checkin,
            checkin_reminders: Vec::new(),
            participants: Vec::new(),
            matches: Vec::new(),
            streamers: Vec::new(),
            winner_categories: Vec::new(),
            loser_categories: Vec::new(),
            top_8: Top8::default(),
            task_errors: 0,
            register_message_id: None,
            last_ranking_fetch: None,
        })
    }

    pub fn start_registration(&mut self) -> EngineResult<()> {
        if self.phase != TournamentPhase::Pending && self.phase != TournamentPhase::Register {
            return Err(EngineError::WrongPhase {
                operation: "start_registration".to_string(),
                allowed: vec!["Pending".to_string(), "Register".to_string()],
                actual: format!("{:?}", self.phase),
            });
        }
        self.phase = TournamentPhase::Register;
        self.register_phase = SubPhase::Ongoing;
        Ok(())
    }

    /// closes the registration window. If `autostop_register` is set and a
    /// second opening is scheduled, the sub-phase goes `OnHold` rather than
    /// `Done` so the scheduler reopens it later.
    pub fn end_registration(&mut self) -> EngineResult<()> {
        if self.register_phase != SubPhase::Ongoing {
            return Err(EngineError::WrongPhase {
                operation: "end_registration".to_string(),
                allowed: vec!["Ongoing".to_string()],
                actual: format!("{:?}", self.register_phase),
            });
        }
        self.register_phase = if self.register.second_start.is_some() {
            SubPhase::OnHold
        } else {
            SubPhase::Done
        };
        Ok(())
    }

    /// starts check-in, unless nobody has registered: an empty roster is a
    /// no-op check-in, short-circuited straight to `Done` (spec.md §4.2).
    pub fn start_checkin(&mut self) -> EngineResult<()> {
        if self.checkin_phase == SubPhase::Done {
            return Err(EngineError::WrongPhase {
                operation: "start_checkin".to_string(),
                allowed: vec!["Manual".to_string(), "Pending".to_string()],
                actual: format!("{:?}", self.checkin_phase),
            });
        }
        if self.participants.is_empty() {
            self.checkin_phase = SubPhase::Done;
            return Ok(());
        }
        self.checkin_phase = SubPhase::Ongoing;
        self.checkin_reminders = compute_checkin_reminders(&self.checkin);
        for p in &mut self.participants {
            p.checked_in = false;
        }
        Ok(())
    }

    /// evaluates a reminder call: returns the list of user refs of
    /// participants who still haven't checked in, for the caller to notify.
    pub fn call_checkin(&self) -> Vec<UserRef> {
        self.participants
            .iter()
            .filter(|p| !p.checked_in)
            .map(|p| p.user.clone())
            .collect()
    }

    /// closes check-in, dropping any participant who never checked in.
    pub fn end_checkin(&mut self) -> EngineResult<Vec<Participant>> {
        if self.checkin_phase != SubPhase::Ongoing {
            return Err(EngineError::WrongPhase {
                operation: "end_checkin".to_string(),
                allowed: vec!["Ongoing".to_string()],
                actual: format!("{:?}", self.checkin_phase),
            });
        }
        self.checkin_phase = SubPhase::Done;
        let (kept, dropped): (Vec<_>, Vec<_>) =
            self.participants.drain(..).partition(|p| p.checked_in);
        self.participants = kept;
        Ok(dropped)
    }

    /// [`Tournament::end_checkin`], additionally destroying the remote
    /// presence of every dropped participant who had already been uploaded
    /// (spec.md §4.2 `endCheckin`: "removing provider presence if
    /// uploaded"). Kept separate from `end_checkin` so tests and restores
    /// that don't have a provider handy can still exercise the pure
    /// transition.
    pub async fn end_checkin_and_destroy(
        &mut self,
        provider: &dyn ProviderPort,
    ) -> EngineResult<Vec<Participant>> {
        let dropped = self.end_checkin()?;
        for p in &dropped {
            if let Some(player_id) = &p.player_id {
                provider.destroy_participant(player_id).await?;
            }
        }
        Ok(dropped)
    }

    /// transitions into `Ongoing` once the bracket has been started and
    /// reconciled at least once, deriving `top_8` from the match rounds
    /// just pulled from the remote provider.
    pub fn start(&mut self, rounds: &[i32]) -> EngineResult<()> {
        if self.phase != TournamentPhase::Awaiting {
            return Err(EngineError::WrongPhase {
                operation: "start".to_string(),
                allowed: vec!["Awaiting".to_string()],
                actual: format!("{:?}", self.phase),
            });
        }
        self.top_8 = Top8::derive(rounds, self.config.start_bo5)
            .ok_or_else(|| EngineError::Invariant("no matches after bracket start".to_string()))?;
        for m in &mut self.matches {
            m.is_top8 = self.top_8.contains(m.round);
            m.is_bo5 = self.top_8.is_bo5(m.round);
            m.checked_dq = m.is_top8;
        }
        self.phase = TournamentPhase::Ongoing;
        Ok(())
    }

    pub fn end(&mut self) -> EngineResult<()> {
        if self.phase != TournamentPhase::Ongoing {
            return Err(EngineError::WrongPhase {
                operation: "end".to_string(),
                allowed: vec!["Ongoing".to_string()],
                actual: format!("{:?}", self.phase),
            });
        }
        self.phase = TournamentPhase::Done;
        Ok(())
    }

    /// clears matches and streamers and returns to `Awaiting`, keeping
    /// participants and their remote ids so they don't need re-uploading.
    pub fn reset_bracket(&mut self) -> EngineResult<()> {
        if self.phase != TournamentPhase::Ongoing && self.phase != TournamentPhase::Done {
            return Err(EngineError::WrongPhase {
                operation: "reset_bracket".to_string(),
                allowed: vec!["Ongoing".to_string(), "Done".to_string()],
                actual: format!("{:?}", self.phase),
            });
        }
        self.matches.clear();
        self.streamers.clear();
        self.top_8 = Top8::default();
        for p in &mut self.participants {
            p.match_id = None;
            p.spoke = false;
        }
        self.phase = TournamentPhase::Awaiting;
        Ok(())
    }

    pub fn new_match_from_remote(&mut self, m: &Match) {
        self.matches.push(m.clone());
    }

    /// whether registration and check-in have both run out of scheduled
    /// transitions (spec.md §4.2: `endRegistration`/`endCheckin`, "if no
    /// further scheduled events remain"). `OnHold` still has
    /// `register_second_start`/`register_stop` ahead of it, so it does not
    /// count as exhausted.
    fn is_schedule_exhausted(&self) -> bool {
        matches!(self.register_phase, SubPhase::Manual | SubPhase::Done)
            && matches!(self.checkin_phase, SubPhase::Manual | SubPhase::Done)
    }

    /// called by the runtime after processing due scheduler events each
    /// tick: moves `phase` from `Register` to `Awaiting` once both
    /// sub-phases are exhausted, returning whether it did so. The caller
    /// uses that signal to trigger the `seedAndUpload` background job
    /// (spec.md §4.2).
    pub fn try_transition_to_awaiting(&mut self) -> bool {
        if self.phase == TournamentPhase::Register && self.is_schedule_exhausted() {
            self.phase = TournamentPhase::Awaiting;
            true
        } else {
            false
        }
    }

    /// fetches the remote tournament and either hands back a fresh draft, or
    /// — if the bracket is already underway on the remote — resumes directly
    /// into `Ongoing` (spec.md §4.2 `setup`, "AlreadyStarted"). The resume
    /// path disables registration/check-in, matches every active remote
    /// participant to a chat user through `resolve_user_by_name`, and
    /// destroys the remote presence of anyone who can't be matched.
    pub async fn setup_or_resume(
        remote_id: RemoteId,
        provider: &dyn ProviderPort,
        notifier: &dyn crate::ports::notifier::NotifierPort,
        config: TournamentConfig,
        config_name: String,
    ) -> EngineResult<SetupOutcome> {
        let info = provider
            .show_tournament(remote_id.0.as_str())
            .await
            .map_err(EngineError::Provider)?;
        let tournament_start = TzInstant::new(info.start_at, 0);

        if ALREADY_STARTED_STATUSES.contains(&info.status.as_str()) {
            let mut tournament = Self::blank_ongoing(remote_id, &info, tournament_start, config, config_name);

            let remote_participants = provider.list_participants().await.map_err(EngineError::Provider)?;
            let mut unmatched = Vec::new();
            for rp in remote_participants.into_iter().filter(|p| p.active) {
                match notifier.resolve_user_by_name(&rp.name).await {
                    Some(user) => {
                        let mut participant = Participant::new(user);
                        participant.player_id = Some(rp.id);
                        tournament.participants.push(participant);
                    }
                    None => unmatched.push(rp.id),
                }
            }
            for id in &unmatched {
                provider.destroy_participant(id).await.map_err(EngineError::Provider)?;
            }

            return Ok(SetupOutcome::Resumed { tournament, unmatched });
        }

        let tournament = Self::setup(
            remote_id,
            info.name,
            info.game,
            info.url,
            info.limit,
            tournament_start,
            config,
            config_name,
        )?;
        Ok(SetupOutcome::Draft(tournament))
    }

    /// builds a tournament that resumed straight into `Ongoing`: registration
    /// and check-in are both `Done`, and `top_8` is left at its default until
    /// the next reconcile pass derives it from the remote rounds (mirroring
    /// `start`).
    fn blank_ongoing(
        remote_id: RemoteId,
        info: &RemoteTournamentInfo,
        tournament_start: TzInstant,
        config: TournamentConfig,
        config_name: String,
    ) -> Self {
        let (register, checkin) = derive_timing(tournament_start, &config);
        Self {
            remote_id,
            name: info.name.clone(),
            game: info.game.clone(),
            url: info.url.clone(),
            limit: info.limit,
            tournament_start,
            config,
            config_name,
            phase: TournamentPhase::Ongoing,
            register_phase: SubPhase::Done,
            checkin_phase: SubPhase::Done,
            ignored_events: HashSet::new(),
            register,
            checkin,
            checkin_reminders: Vec::new(),
            participants: Vec::new(),
            matches: Vec::new(),
            streamers: Vec::new(),
            winner_categories: Vec::new(),
            loser_categories: Vec::new(),
            top_8: Top8::default(),
            task_errors: 0,
            register_message_id: None,
            last_ranking_fetch: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::UserRef;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    fn sample_tournament() -> Tournament {
        Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap()
    }

    #[test]
    fn checkin_with_no_participants_short_circuits_to_done() {
        let mut t = sample_tournament();
        t.start_checkin().unwrap();
        assert_eq!(t.checkin_phase, SubPhase::Done);
    }

    #[test]
    fn checkin_with_participants_opens_normally() {
        let mut t = sample_tournament();
        t.participants.push(Participant::new(UserRef {
            id: "u1".into(),
            display_name: "Alice".into(),
        }));
        t.start_checkin().unwrap();
        assert_eq!(t.checkin_phase, SubPhase::Ongoing);
    }

    #[test]
    fn awaiting_transition_waits_for_both_subphases() {
        let mut t = sample_tournament();
        t.start_registration().unwrap();
        assert!(!t.try_transition_to_awaiting());

        t.register_phase = SubPhase::Ongoing;
        t.end_registration().unwrap();
        assert_eq!(t.register_phase, SubPhase::Done);
        // checkin never started (Manual): schedule is exhausted already.
        assert!(t.try_transition_to_awaiting());
        assert_eq!(t.phase, TournamentPhase::Awaiting);
    }

    #[test]
    fn on_hold_register_blocks_awaiting_transition() {
        let mut t = sample_tournament();
        t.register.second_start = Some(ts(20_000));
        t.start_registration().unwrap();
        t.end_registration().unwrap();
        assert_eq!(t.register_phase, SubPhase::OnHold);
        assert!(!t.try_transition_to_awaiting());
    }

    #[test]
    fn a_checkin_window_under_a_minute_ignores_its_own_close_event() {
        let mut config = TournamentConfig::default();
        config.checkin.opening = 400;
        config.checkin.closing = 370; // a 30 second window.
        let t = Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            config,
            "default".into(),
        )
        .unwrap();
        assert!(t.ignored_events.contains(&EventName::CheckinStop));
    }

    #[tokio::test]
    async fn end_checkin_and_destroy_removes_remote_presence_of_dropped_participants() {
        let mut t = sample_tournament();
        let mut checked_in = Participant::new(UserRef { id: "u1".into(), display_name: "Alice".into() });
        checked_in.checked_in = true;
        let mut no_show = Participant::new(UserRef { id: "u2".into(), display_name: "Bob".into() });
        no_show.player_id = Some(RemoteId::new("remote-2"));
        t.participants.push(checked_in);
        t.participants.push(no_show);
        t.start_checkin().unwrap();
        let checked_id = t.participants[0].id;
        t.find_participant_mut(checked_id).unwrap().checked_in = true;

        let provider = FakeProvider::default();
        let dropped = t.end_checkin_and_destroy(&provider).await.unwrap();

        assert_eq!(dropped.len(), 1);
        assert_eq!(provider.destroyed.lock().unwrap().as_slice(), [RemoteId::new("remote-2")]);
    }

    #[tokio::test]
    async fn setup_or_resume_returns_a_draft_when_the_remote_is_still_pending() {
        let provider = FakeProvider::default();
        let notifier = FakeNotifier::default();
        let outcome = Tournament::setup_or_resume(
            RemoteId::new("t1"),
            &provider,
            &notifier,
            TournamentConfig::default(),
            "default".into(),
        )
        .await
        .unwrap();
        match outcome {
            SetupOutcome::Draft(t) => assert_eq!(t.phase, TournamentPhase::Pending),
            SetupOutcome::Resumed { .. } => panic!("expected a draft"),
        }
    }

    #[tokio::test]
    async fn setup_or_resume_resumes_into_ongoing_and_destroys_unmatched_participants() {
        let provider = FakeProvider::default();
        provider.set_status("underway");
        provider.seed_participant(RemoteId::new("r1"), "Alice", true);
        provider.seed_participant(RemoteId::new("r2"), "Ghost", true);

        let notifier = FakeNotifier::default();
        notifier.register("Alice", UserRef { id: "u1".into(), display_name: "Alice".into() });

        let outcome = Tournament::setup_or_resume(
            RemoteId::new("t1"),
            &provider,
            &notifier,
            TournamentConfig::default(),
            "default".into(),
        )
        .await
        .unwrap();

        match outcome {
            SetupOutcome::Resumed { tournament, unmatched } => {
                assert_eq!(tournament.phase, TournamentPhase::Ongoing);
                assert_eq!(tournament.register_phase, SubPhase::Done);
                assert_eq!(tournament.checkin_phase, SubPhase::Done);
                assert_eq!(tournament.participants.len(), 1);
                assert_eq!(unmatched, vec![RemoteId::new("r2")]);
                assert_eq!(provider.destroyed.lock().unwrap().as_slice(), [RemoteId::new("r2")]);
            }
            SetupOutcome::Draft(_) => panic!("expected a resume"),
        }
    }

    use crate::ports::notifier::{
        AnnouncementKind, MatchChannelRoles, MatchNotifyKind, NotifierPort, ToKind, UserNotifyKind,
    };
    use crate::ports::provider::{
        ProviderResult, RemoteMatch, RemoteParticipant,
    };
    use crate::identifiers::{CategoryHandle, ChannelHandle, MatchId};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// minimal fake collaborators for tests inside this crate, since
    /// `tournament_testkit` depends on this crate and can't be used here.
    #[derive(Default)]
    struct FakeProvider {
        status: Mutex<String>,
        participants: Mutex<Vec<RemoteParticipant>>,
        destroyed: Mutex<Vec<RemoteId>>,
    }

    impl FakeProvider {
        fn set_status(&self, status: &str) {
            *self.status.lock().unwrap() = status.to_string();
        }

        fn seed_participant(&self, id: RemoteId, name: &str, active: bool) {
            self.participants.lock().unwrap().push(RemoteParticipant {
                id,
                name: name.to_string(),
                active,
            });
        }
    }

    #[async_trait]
    impl ProviderPort for FakeProvider {
        async fn show_tournament(&self, tournament_ref: &str) -> ProviderResult<RemoteTournamentInfo> {
            let status = self.status.lock().unwrap().clone();
            let status = if status.is_empty() { "pending".to_string() } else { status };
            Ok(RemoteTournamentInfo {
                id: RemoteId::new(tournament_ref),
                name: "Test".to_string(),
                game: "Game".to_string(),
                url: "http://example.test".to_string(),
                limit: None,
                status,
                start_at: 10_000,
            })
        }
        async fn start_tournament(&self) -> ProviderResult<()> {
            Ok(())
        }
        async fn finalize_tournament(&self) -> ProviderResult<()> {
            Ok(())
        }
        async fn reset_tournament(&self) -> ProviderResult<()> {
            Ok(())
        }
        async fn list_participants(&self) -> ProviderResult<Vec<RemoteParticipant>> {
            Ok(self.participants.lock().unwrap().clone())
        }
        async fn create_participant(&self, name: &str, _seed: u32) -> ProviderResult<RemoteId> {
            let id = RemoteId::new(format!("new-{name}"));
            Ok(id)
        }
        async fn destroy_participant(&self, id: &RemoteId) -> ProviderResult<()> {
            self.destroyed.lock().unwrap().push(id.clone());
            Ok(())
        }
        async fn list_matches(&self) -> ProviderResult<Vec<RemoteMatch>> {
            Ok(Vec::new())
        }
        async fn update_match(&self, _id: &RemoteId, _scores_csv: &str, _winner_id: &RemoteId) -> ProviderResult<()> {
            Ok(())
        }
        async fn mark_match_underway(&self, _id: &RemoteId) -> ProviderResult<()> {
            Ok(())
        }
        async fn unmark_match_underway(&self, _id: &RemoteId) -> ProviderResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        users_by_name: Mutex<HashMap<String, UserRef>>,
    }

    impl FakeNotifier {
        fn register(&self, name: &str, user: UserRef) {
            self.users_by_name.lock().unwrap().insert(name.to_string(), user);
        }
    }

    #[async_trait]
    impl NotifierPort for FakeNotifier {
        async fn notify_announcement(
            &self,
            _kind: AnnouncementKind,
            _payload: serde_json::Value,
            existing_message_id: Option<&str>,
        ) -> Option<String> {
            Some(existing_message_id.map(str::to_string).unwrap_or_else(|| "msg".to_string()))
        }
        async fn notify_to(&self, _kind: ToKind, _payload: serde_json::Value) {}
        async fn notify_match(&self, _match_id: MatchId, _kind: MatchNotifyKind, _payload: serde_json::Value) {}
        async fn notify_user(&self, _user: &UserRef, _kind: UserNotifyKind, _payload: serde_json::Value) {}
        async fn create_category(&self, name: &str) -> anyhow::Result<CategoryHandle> {
            Ok(CategoryHandle(name.to_string()))
        }
        async fn create_match_channel(
            &self,
            _category: &CategoryHandle,
            match_id: MatchId,
            _allowed: &MatchChannelRoles,
        ) -> anyhow::Result<ChannelHandle> {
            Ok(ChannelHandle(format!("match-{}", match_id.0)))
        }
        async fn delete_channel(&self, _handle: &ChannelHandle) -> anyhow::Result<()> {
            Ok(())
        }
        async fn set_channel_permissions(&self, _handle: &ChannelHandle, _user: &UserRef) -> anyhow::Result<()> {
            Ok(())
        }
        async fn resolve_user_by_name(&self, name: &str) -> Option<UserRef> {
            self.users_by_name.lock().unwrap().get(name).cloned()
        }
    }
}
