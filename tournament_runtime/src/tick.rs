//! one 15-second `LoopTask` tick: reconcile, launch, timeout, overtime,
//! stream, save, in that exact order (spec.md §5 "Ordering guarantees").
//!
//! Grounded on `cr_single_instance`'s tick-driven poll loop, generalized
//! from a pub/sub fan-out to the engine's reconcile/launch/timeout/overtime
//! passes defined in `tournament_core::tournament::*`.

use crate::handle::TournamentHandle;
use serde_json::{json, Value};
use tournament_core::phase::EventName;
use tournament_core::ports::notifier::{AnnouncementKind, MatchNotifyKind, NotifierPort, UserNotifyKind};
use tournament_core::tournament::matches::LaunchTarget;
use tournament_core::tournament::passes::{channel_roles, notify_warn};
use tournament_core::tournament::CATEGORY_CAPACITY;
use tournament_core::{CategoryHandle, Tournament, TzInstant};

/// runs exactly one tick against `handle`, holding its lock for the whole
/// duration (spec.md §3 "lock"). Returns whatever error aborted the tick;
/// the caller (`loop_task`) is responsible for the error-budget bookkeeping.
pub async fn run_tick(handle: &TournamentHandle) -> anyhow::Result<()> {
    let mut t = handle.tournament.lock().await;
    let now = TzInstant::from_utc_now(t.tournament_start.tz_offset_seconds());

    run_scheduler(&mut t, handle, now).await?;
    t.reconcile_participants(handle.provider.as_ref()).await?;
    let reconcile_report = t.reconcile_matches(handle.provider.as_ref(), now).await?;
    if !reconcile_report.new_matches.is_empty() || !reconcile_report.completed_matches.is_empty() {
        let mut sets: Vec<u64> = reconcile_report
            .new_matches
            .iter()
            .chain(&reconcile_report.completed_matches)
            .filter_map(|id| t.find_match(*id).map(|m| m.set))
            .collect();
        sets.sort_unstable();
        sets.dedup();
        handle
            .notifier
            .notify_announcement(AnnouncementKind::BracketChange, json!({ "sets": sets }), None)
            .await;
    }

    t.check_streamers_integrity();

    run_launch_pass(&mut t, handle, now).await?;
    run_timeout_pass(&mut t, handle, now).await?;
    run_overtime_pass(&mut t, handle, now).await;
    run_stream_pass(&mut t, handle, now).await;

    let snapshot = t.to_snapshot();
    handle
        .config_store
        .save_snapshot(handle.config_key, &snapshot)
        .await?;

    Ok(())
}

/// evaluates the due scheduler events, applies them, and — once the
/// register/check-in schedule is exhausted — fires the background seed +
/// upload job (spec.md §4.2 `endRegistration`/`endCheckin` terminal branch).
async fn run_scheduler(t: &mut Tournament, handle: &TournamentHandle, now: TzInstant) -> anyhow::Result<()> {
    for event in t.due_events(now) {
        match event {
            EventName::CheckinStop => {
                let dropped = t.end_checkin_and_destroy(handle.provider.as_ref()).await?;
                for p in &dropped {
                    handle
                        .notifier
                        .notify_user(&p.user, UserNotifyKind::Unregistered, Value::Null)
                        .await;
                }
            }
            EventName::RegisterStart | EventName::RegisterSecondStart => {
                t.apply_event(event)?;
                let message_id = handle
                    .notifier
                    .notify_announcement(
                        AnnouncementKind::RegistrationOpen,
                        json!({ "second": event == EventName::RegisterSecondStart }),
                        t.register_message_id.as_deref(),
                    )
                    .await;
                t.register_message_id = message_id;
            }
            EventName::RegisterStop => {
                t.apply_event(event)?;
                handle
                    .notifier
                    .notify_announcement(
                        AnnouncementKind::RegistrationClosed,
                        Value::Null,
                        t.register_message_id.as_deref(),
                    )
                    .await;
                // registration is fully closed; the pinned record has
                // nothing left to update until the next opening.
                t.register_message_id = None;
            }
            EventName::CheckinStart => {
                t.apply_event(event)?;
                handle
                    .notifier
                    .notify_announcement(AnnouncementKind::CheckinOpen, Value::Null, None)
                    .await;
            }
        }
    }

    for reminder in t.due_checkin_reminders(now) {
        let unchecked = t.call_checkin();
        handle
            .notifier
            .notify_announcement(
                AnnouncementKind::CheckinReminder,
                json!({ "minutes_before_stop": reminder.minutes_before_stop }),
                None,
            )
            .await;
        if reminder.send_dm {
            for user in &unchecked {
                handle
                    .notifier
                    .notify_user(user, UserNotifyKind::CheckinReminder, Value::Null)
                    .await;
            }
        }
    }

    if t.try_transition_to_awaiting() {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(err) = crate::seed::seed_and_upload(&handle, false).await {
                tracing::warn!(error = %err, "seed_and_upload failed");
                handle
                    .notifier
                    .notify_to(
                        tournament_core::ports::notifier::ToKind::ManualFixRequired,
                        json!({ "reason": err.to_string() }),
                    )
                    .await;
            }
        });
    }
    Ok(())
}

async fn run_launch_pass(t: &mut Tournament, handle: &TournamentHandle, now: TzInstant) -> anyhow::Result<()> {
    for id in t.matches_to_launch() {
        let winners_side = t.find_match(id).map(|m| m.round > 0).unwrap_or(true);
        let category = ensure_category(t, handle.notifier.as_ref(), winners_side).await?;
        let roles = channel_roles(t, id);

        let channel = match &roles {
            Some(roles) => match handle.notifier.create_match_channel(&category, id, roles).await {
                Ok(channel) => Some(channel),
                // degraded mode: launch continues without a channel (spec.md §4.3).
                Err(err) => {
                    tracing::warn!(error = %err, match_id = ?id, "create_match_channel failed");
                    None
                }
            },
            None => None,
        };

        if let (Some(channel), Some(roles)) = (&channel, &roles) {
            let _ = handle.notifier.set_channel_permissions(channel, &roles.player1).await;
            let _ = handle.notifier.set_channel_permissions(channel, &roles.player2).await;
        }

        let target = t.mark_match_launched(id, channel, now)?;
        if target == LaunchTarget::Ongoing {
            if let Some(remote_id) = t.find_match(id).map(|m| m.remote_id.clone()) {
                let _ = handle.provider.mark_match_underway(&remote_id).await;
            }
            handle
                .notifier
                .notify_match(id, MatchNotifyKind::Launched, Value::Null)
                .await;
        }
    }
    Ok(())
}

/// picks the category a freshly launched match on `winners_side` should
/// land in, creating a new one through [`NotifierPort::create_category`]
/// when the current tail category is full or none exists yet (spec.md
/// §4.3: "at most 50 channels live per category").
async fn ensure_category(
    t: &mut Tournament,
    notifier: &dyn NotifierPort,
    winners_side: bool,
) -> anyhow::Result<CategoryHandle> {
    let len = if winners_side {
        t.winner_categories.len()
    } else {
        t.loser_categories.len()
    };
    let load = if len == 0 { CATEGORY_CAPACITY } else { t.category_load(len - 1, winners_side) };

    if len == 0 || load >= CATEGORY_CAPACITY {
        let side = if winners_side { "winners" } else { "losers" };
        let name = format!("{side}-{}", len + 1);
        let created = notifier.create_category(&name).await?;
        if winners_side {
            t.winner_categories.push(created.clone());
        } else {
            t.loser_categories.push(created.clone());
        }
        Ok(created)
    } else {
        let categories = if winners_side { &t.winner_categories } else { &t.loser_categories };
        Ok(categories.last().expect("len > 0").clone())
    }
}

async fn run_timeout_pass(t: &mut Tournament, handle: &TournamentHandle, now: TzInstant) -> anyhow::Result<()> {
    let report = t.timeout_pass(now);

    for (match_id, player) in report.to_disqualify {
        t.disqualify(handle.provider.as_ref(), match_id, player, now, true).await?;
        notify_warn(handle.notifier.as_ref(), match_id, MatchNotifyKind::Disqualified).await;
    }
    for match_id in report.both_silent_dropped {
        notify_warn(handle.notifier.as_ref(), match_id, MatchNotifyKind::ForcedEnd).await;
    }
    for channel in report.channels_to_delete {
        let _ = handle.notifier.delete_channel(&channel).await;
    }
    Ok(())
}

async fn run_overtime_pass(t: &mut Tournament, handle: &TournamentHandle, now: TzInstant) {
    let report = t.overtime_pass(now);
    for match_id in report.first_warned {
        notify_warn(handle.notifier.as_ref(), match_id, MatchNotifyKind::WarnLength).await;
    }
    for match_id in report.timeout_warned {
        notify_warn(handle.notifier.as_ref(), match_id, MatchNotifyKind::WarnTimeout).await;
    }
}

async fn run_stream_pass(t: &mut Tournament, handle: &TournamentHandle, now: TzInstant) {
    let report = t.stream_pass(now);
    for match_id in report.started {
        notify_warn(handle.notifier.as_ref(), match_id, MatchNotifyKind::StreamStarted).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::TournamentHandle;
    use std::sync::Arc;
    use tournament_core::config::TournamentConfig;
    use tournament_core::identifiers::{ParticipantId, RemoteId, UserRef};
    use tournament_core::participant::Participant;
    use tournament_core::ports::config_store::ConfigStorePort;
    use tournament_core::ports::notifier::NotifierPort;
    use tournament_core::ports::provider::ProviderPort;
    use tournament_core::ports::ranking::RankingPort;
    use tournament_core::top8::Top8;
    use tournament_core::{MatchPhase, SubPhase, TournamentPhase};
    use tournament_testkit::{MockConfigStore, MockNotifier, MockProvider, MockRanking};
    use uuid::Uuid;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    fn ongoing_tournament_with_one_pending_match() -> (Tournament, ParticipantId, ParticipantId, tournament_core::MatchId) {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        // bypass the registration/check-in scheduler entirely: this test
        // drives an already-running bracket.
        t.phase = TournamentPhase::Ongoing;
        t.register_phase = SubPhase::Done;
        t.checkin_phase = SubPhase::Done;

        let p1 = Participant::new(UserRef { id: "a".into(), display_name: "Alice".into() });
        let p2 = Participant::new(UserRef { id: "b".into(), display_name: "Bob".into() });
        let (p1_id, p2_id) = (p1.id, p2.id);
        t.participants.push(p1);
        t.participants.push(p2);

        let m = tournament_core::Match::new(RemoteId::new("m1"), 1, 1, p1_id, p2_id, &Top8::default());
        let mid = m.id;
        t.matches.push(m);

        (t, p1_id, p2_id, mid)
    }

    fn sample_handle(t: Tournament) -> (TournamentHandle, Arc<MockNotifier>, Arc<MockConfigStore>) {
        let provider: Arc<dyn ProviderPort> = Arc::new(MockProvider::new());
        let notifier = Arc::new(MockNotifier::new());
        let ranking: Arc<dyn RankingPort> = Arc::new(MockRanking::new());
        let config_store = Arc::new(MockConfigStore::new());
        let config_key = Uuid::new_v4();
        let handle = TournamentHandle::new(
            t,
            provider,
            notifier.clone() as Arc<dyn NotifierPort>,
            ranking,
            config_store.clone() as Arc<dyn ConfigStorePort>,
            config_key,
        );
        (handle, notifier, config_store)
    }

    #[tokio::test]
    async fn a_tick_launches_a_pending_match_and_saves_a_snapshot() {
        let (t, _p1, _p2, mid) = ongoing_tournament_with_one_pending_match();
        let (handle, _notifier, config_store) = sample_handle(t);

        run_tick(&handle).await.unwrap();

        let locked = handle.tournament.lock().await;
        let m = locked.find_match(mid).unwrap();
        assert_eq!(m.phase, MatchPhase::Ongoing);
        assert!(m.channel.is_some());
        assert_eq!(locked.winner_categories.len(), 1);
        drop(locked);

        assert!(config_store
            .load_snapshot(handle.config_key)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn a_tick_notifies_launch_for_the_newly_ongoing_match() {
        let (t, _p1, _p2, mid) = ongoing_tournament_with_one_pending_match();
        let (handle, notifier, _config_store) = sample_handle(t);

        run_tick(&handle).await.unwrap();

        let notified = notifier.match_notifications.lock().unwrap();
        assert!(notified
            .iter()
            .any(|(id, kind, _)| *id == mid && *kind == MatchNotifyKind::Launched));
    }

    #[tokio::test]
    async fn resume_preemption_runs_before_the_first_tick_without_disqualifying() {
        let (mut t, p1, _p2, mid) = ongoing_tournament_with_one_pending_match();
        t.config.delay = Some(std::time::Duration::from_secs(900));
        t.find_participant_mut(p1).unwrap().spoke = false;
        if let Some(m) = t.find_match_mut(mid) {
            m.phase = MatchPhase::Ongoing;
            m.start_time = Some(ts(10_000));
        }
        let (handle, _notifier, _config_store) = sample_handle(t);

        {
            let mut locked = handle.tournament.lock().await;
            let now = ts(20_000);
            let forced = locked.preempt_afk_on_resume(now);
            assert_eq!(forced, 1);
            assert_eq!(locked.find_match(mid).unwrap().phase, MatchPhase::Ongoing);
        }
    }

    #[tokio::test]
    async fn a_tick_announces_registration_opening() {
        let mut config = TournamentConfig::default();
        config.registration.opening = 100;
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
        let (handle, notifier, _config_store) = sample_handle(t);

        run_tick(&handle).await.unwrap();

        let announcements = notifier.announcements.lock().unwrap();
        assert!(announcements
            .iter()
            .any(|(kind, _)| *kind == AnnouncementKind::RegistrationOpen));
        let locked = handle.tournament.lock().await;
        assert_eq!(locked.register_phase, SubPhase::Ongoing);
        assert!(locked.register_message_id.is_some());
    }

    #[tokio::test]
    async fn closing_registration_edits_the_pinned_message_then_clears_it() {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        t.register_phase = SubPhase::Ongoing;
        t.register.stop = ts(0);
        t.register_message_id = Some("pinned-1".to_string());
        let (handle, notifier, _config_store) = sample_handle(t);

        run_tick(&handle).await.unwrap();

        assert!(notifier
            .announcements
            .lock()
            .unwrap()
            .iter()
            .any(|(kind, _)| *kind == AnnouncementKind::RegistrationClosed));
        let locked = handle.tournament.lock().await;
        assert!(locked.register_message_id.is_none());
    }

    #[tokio::test]
    async fn a_tick_sends_a_checkin_reminder_dm_for_unchecked_participants() {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        t.phase = TournamentPhase::Register;
        t.register_phase = SubPhase::Done;
        let alice = UserRef { id: "a".into(), display_name: "Alice".into() };
        t.participants.push(Participant::new(alice.clone()));
        t.checkin_phase = SubPhase::Ongoing;
        // `stop` sits safely in the future so the tick's real wall-clock
        // `now` never fires `CheckinStop`; the reminder's offset is large
        // enough that its trigger time still falls before `now`.
        let real_now = tournament_core::TzInstant::from_utc_now(0).epoch_seconds();
        t.checkin = tournament_core::CheckinTiming {
            start: ts(real_now - 2_000_000),
            stop: ts(real_now + 1_000_000),
        };
        t.checkin_reminders = vec![tournament_core::CheckinReminder { minutes_before_stop: 20_000, send_dm: true }];
        let (handle, notifier, _config_store) = sample_handle(t);

        run_tick(&handle).await.unwrap();

        let announcements = notifier.announcements.lock().unwrap();
        assert!(announcements
            .iter()
            .any(|(kind, _)| *kind == AnnouncementKind::CheckinReminder));
        let user_notifications = notifier.user_notifications.lock().unwrap();
        assert!(user_notifications
            .iter()
            .any(|(user, kind, _)| *user == alice && *kind == UserNotifyKind::CheckinReminder));
    }
}

