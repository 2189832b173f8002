//! `toDict` / `fromSavedData` round-tripping through [`TournamentSnapshot`]
//! (spec.md §6, §8 "Round-trip").
//!
//! Grounded on `db_postgres::tournament_base`'s `DbTournamentBase` /
//! `WriteDbTournamentBase` row<->domain mapping pattern, generalized from
//! SQL rows to the JSON snapshot this engine hands off to the embedding
//! application's configuration store.

use super::lifecycle::derive_timing;
use super::Tournament;
use crate::config::TournamentConfig;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{CategoryHandle, ChannelHandle, RemoteId, UserRef};
use crate::match_::{Match, MatchPhase, Warned};
use crate::participant::Participant;
use crate::phase::{EventName, SubPhase, TournamentPhase};
use crate::snapshot::*;
use crate::streamer::{Streamer, StreamerEntry};
use crate::timing::TzInstant;
use std::collections::HashSet;

/// report of a restore that could not fully resolve every participant back
/// to a live chat user (spec.md §7 `LostParticipant`).
#[derive(Debug, Clone, Default)]
pub struct RestoreReport {
    pub lost_participants: Vec<RemoteId>,
}

fn phase_from_str(s: &str) -> EngineResult<TournamentPhase> {
    Ok(match s {
        "PENDING" => TournamentPhase::Pending,
        "REGISTER" => TournamentPhase::Register,
        "AWAITING" => TournamentPhase::Awaiting,
        "ONGOING" => TournamentPhase::Ongoing,
        "DONE" => TournamentPhase::Done,
        other => return Err(EngineError::Invariant(format!("unknown tournament phase {other:?}"))),
    })
}

fn sub_phase_from_str(s: &str) -> EngineResult<SubPhase> {
    Ok(match s {
        "MANUAL" => SubPhase::Manual,
        "PENDING" => SubPhase::Pending,
        "ONGOING" => SubPhase::Ongoing,
        "ON_HOLD" => SubPhase::OnHold,
        "DONE" => SubPhase::Done,
        other => return Err(EngineError::Invariant(format!("unknown sub-phase {other:?}"))),
    })
}

fn match_phase_from_str(s: &str) -> EngineResult<MatchPhase> {
    Ok(match s {
        "PENDING" => MatchPhase::Pending,
        "ONGOING" => MatchPhase::Ongoing,
        "ON_HOLD" => MatchPhase::OnHold,
        "DONE" => MatchPhase::Done,
        other => return Err(EngineError::Invariant(format!("unknown match phase {other:?}"))),
    })
}

fn match_phase_to_str(p: MatchPhase) -> &'static str {
    match p {
        MatchPhase::Pending => "PENDING",
        MatchPhase::Ongoing => "ONGOING",
        MatchPhase::OnHold => "ON_HOLD",
        MatchPhase::Done => "DONE",
    }
}

fn event_from_str(s: &str) -> Option<EventName> {
    EventName::evaluation_order()
        .into_iter()
        .find(|e| e.as_str() == s)
}

impl Tournament {
    /// serializes the live state into the persisted-state DTO (spec.md §6).
    /// `lock` and the in-flight notification queue are transient and never
    /// appear here (spec.md §8 "Round-trip").
    pub fn to_snapshot(&self) -> TournamentSnapshot {
        let participants = self
            .participants
            .iter()
            .map(|p| ParticipantSnapshot {
                user_id: p.user.id.clone(),
                player_id: p.player_id.clone(),
                spoke: p.spoke,
                checked_in: p.checked_in,
            })
            .collect();

        let matches = self
            .matches
            .iter()
            .map(|m| MatchSnapshot {
                round: m.round,
                set: m.set,
                id: m.remote_id.clone(),
                underway: m.underway,
                player1: self.participant_user_id(m.player1),
                player2: self.participant_user_id(m.player2),
                channel: m.channel.as_ref().map(|c| c.0.clone()),
                start_time: m.start_time.map(|t| t.epoch_seconds()),
                end_time: m.end_time.map(|t| t.epoch_seconds()),
                phase: match_phase_to_str(m.phase).to_string(),
                checked_dq: m.checked_dq,
                warned: WarnedSnapshot::from(m.warned),
                message: m.message.clone(),
            })
            .collect();

        let streamers = self
            .streamers
            .iter()
            .map(|s| {
                let matches: Vec<u64> = s
                    .matches
                    .iter()
                    .filter_map(|e| self.entry_set_number(e))
                    .collect();
                let current_match = s
                    .current_match(|id| self.matches.iter().find(|m| m.id == id))
                    .map(|m| m.set);
                StreamerSnapshot {
                    owner: s.owner.id.clone(),
                    channel: s.channel_handle.clone(),
                    room_id: s.room_id.clone(),
                    room_code: s.room_code.clone(),
                    matches,
                    current_match,
                }
            })
            .collect();

        TournamentSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            id: self.remote_id.clone(),
            name: self.name.clone(),
            game: self.game.clone(),
            url: self.url.clone(),
            limit: self.limit,
            status: phase_to_str(self.phase).to_string(),
            tournament_start: (
                self.tournament_start.epoch_seconds(),
                self.tournament_start.tz_offset_seconds(),
            ),
            config_name: self.config_name.clone(),
            phase: phase_to_str(self.phase).to_string(),
            register_phase: sub_phase_to_str(self.register_phase).to_string(),
            checkin_phase: sub_phase_to_str(self.checkin_phase).to_string(),
            ignored_events: self.ignored_events.iter().map(|e| e.as_str().to_string()).collect(),
            top_8: self.top_8,
            participants,
            matches,
            streamers,
            winner_categories: self.winner_categories.iter().map(|c| c.0.clone()).collect(),
            loser_categories: self.loser_categories.iter().map(|c| c.0.clone()).collect(),
            checkin_reminders: self.checkin_reminders.clone(),
            register_message_id: self.register_message_id.clone(),
        }
    }

    /// rebuilds a `Tournament` from a snapshot and the configuration it was
    /// created under. `resolve_user` maps a persisted `user_id` back to a
    /// live [`UserRef`]; participants that fail to resolve are dropped and
    /// reported via [`RestoreReport::lost_participants`] rather than
    /// failing the whole restore (spec.md §7 `LostParticipant`).
    pub fn from_snapshot(
        snapshot: TournamentSnapshot,
        config: TournamentConfig,
        resolve_user: impl Fn(&str) -> Option<UserRef>,
    ) -> EngineResult<(Self, RestoreReport)> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(EngineError::Invariant(format!(
                "unsupported snapshot schema version {}",
                snapshot.schema_version
            )));
        }

        let tournament_start = TzInstant::new(snapshot.tournament_start.0, snapshot.tournament_start.1);
        let (register, checkin) = derive_timing(tournament_start, &config);

        let mut report = RestoreReport::default();
        let mut user_id_to_participant: Vec<(String, Participant)> = Vec::new();
        for ps in &snapshot.participants {
            let Some(user) = resolve_user(&ps.user_id) else {
                if let Some(player_id) = &ps.player_id {
                    report.lost_participants.push(player_id.clone());
                }
                continue;
            };
            let mut participant = Participant::new(user);
            participant.player_id = ps.player_id.clone();
            participant.spoke = ps.spoke;
            participant.checked_in = ps.checked_in;
            user_id_to_participant.push((ps.user_id.clone(), participant));
        }

        let find_participant_id = |user_id: &str| -> Option<crate::identifiers::ParticipantId> {
            user_id_to_participant
                .iter()
                .find(|(id, _)| id == user_id)
                .map(|(_, p)| p.id)
        };

        let mut matches: Vec<Match> = Vec::with_capacity(snapshot.matches.len());
        for ms in &snapshot.matches {
            let (Some(p1), Some(p2)) = (find_participant_id(&ms.player1), find_participant_id(&ms.player2)) else {
                continue;
            };
            let mut m = Match::new(ms.id.clone(), ms.round, ms.set, p1, p2, &snapshot.top_8);
            m.underway = ms.underway;
            m.channel = ms.channel.clone().map(ChannelHandle);
            m.start_time = ms.start_time.map(|e| TzInstant::new(e, tournament_start.tz_offset_seconds()));
            m.end_time = ms.end_time.map(|e| TzInstant::new(e, tournament_start.tz_offset_seconds()));
            m.phase = match_phase_from_str(&ms.phase)?;
            m.checked_dq = ms.checked_dq;
            m.message = ms.message.clone();
            m.warned = match &ms.warned {
                WarnedSnapshot::None => Warned::None,
                WarnedSnapshot::TimeoutWarnSent(_) => Warned::TimeoutWarnSent,
                WarnedSnapshot::FirstWarnAt(t) => {
                    Warned::FirstWarnAt(TzInstant::new(*t, tournament_start.tz_offset_seconds()))
                }
            };
            matches.push(m);
        }

        for (_, p) in &mut user_id_to_participant {
            if let Some(m) = matches.iter().find(|m| m.player1 == p.id || m.player2 == p.id) {
                if m.phase != MatchPhase::Done {
                    p.match_id = Some(m.id);
                }
            }
        }
        let participants: Vec<Participant> = user_id_to_participant.into_iter().map(|(_, p)| p).collect();

        let mut streamers: Vec<Streamer> = Vec::with_capacity(snapshot.streamers.len());
        for ss in &snapshot.streamers {
            let Some(owner) = resolve_user(&ss.owner) else {
                continue;
            };
            let mut streamer = Streamer::new(owner, ss.channel.clone());
            streamer.room_id = ss.room_id.clone();
            streamer.room_code = ss.room_code.clone();
            streamer.matches = ss
                .matches
                .iter()
                .map(|set| {
                    matches
                        .iter()
                        .find(|m| m.set == *set)
                        .map(|m| StreamerEntry::Match(m.id))
                        .unwrap_or(StreamerEntry::Placeholder(*set))
                })
                .collect();
            streamers.push(streamer);
        }
        for streamer in &streamers {
            for entry in &streamer.matches {
                if let StreamerEntry::Match(id) = entry {
                    if let Some(m) = matches.iter_mut().find(|m| m.id == *id) {
                        m.streamer = Some(streamer.id);
                    }
                }
            }
        }

        let mut ignored_events = HashSet::new();
        for name in &snapshot.ignored_events {
            if let Some(ev) = event_from_str(name) {
                ignored_events.insert(ev);
            }
        }

        let tournament = Tournament {
            remote_id: snapshot.id,
            name: snapshot.name,
            game: snapshot.game,
            url: snapshot.url,
            limit: snapshot.limit,
            tournament_start,
            config,
            config_name: snapshot.config_name,
            phase: phase_from_str(&snapshot.phase)?,
            register_phase: sub_phase_from_str(&snapshot.register_phase)?,
            checkin_phase: sub_phase_from_str(&snapshot.checkin_phase)?,
            ignored_events,
            register,
            checkin,
            checkin_reminders: snapshot.checkin_reminders,
            participants,
            matches,
            streamers,
            winner_categories: snapshot.winner_categories.into_iter().map(CategoryHandle).collect(),
            loser_categories: snapshot.loser_categories.into_iter().map(CategoryHandle).collect(),
            top_8: snapshot.top_8,
            task_errors: 0,
            register_message_id: snapshot.register_message_id,
            last_ranking_fetch: None,
        };

        Ok((tournament, report))
    }

    fn participant_user_id(&self, id: crate::identifiers::ParticipantId) -> String {
        self.find_participant(id).map(|p| p.user.id.clone()).unwrap_or_default()
    }

    fn entry_set_number(&self, entry: &StreamerEntry) -> Option<u64> {
        match entry {
            StreamerEntry::Placeholder(set) => Some(*set),
            StreamerEntry::Match(id) => self.find_match(*id).map(|m| m.set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use std::collections::HashMap;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    #[test]
    fn round_trip_preserves_core_fields() {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test Cup".into(),
            "Game".into(),
            "http://example.test".into(),
            Some(32),
            ts(100_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        t.start_registration().unwrap();
        let user = UserRef {
            id: "u1".into(),
            display_name: "Alice".into(),
        };
        let mut users = HashMap::new();
        users.insert("u1".to_string(), user.clone());

        let participant = Participant::new(user);
        t.participants.push(participant);

        let snapshot = t.to_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let round_tripped: TournamentSnapshot = serde_json::from_str(&json).unwrap();

        let (restored, report) = Tournament::from_snapshot(
            round_tripped,
            TournamentConfig::default(),
            |id| users.get(id).cloned(),
        )
        .unwrap();

        assert!(report.lost_participants.is_empty());
        assert_eq!(restored.name, "Test Cup");
        assert_eq!(restored.participants.len(), 1);
        assert_eq!(restored.phase, TournamentPhase::Register);
        assert_eq!(restored.register_phase, SubPhase::Ongoing);
    }

    #[test]
    fn unresolvable_participant_is_reported_lost() {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test Cup".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(100_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        let mut participant = Participant::new(UserRef {
            id: "ghost".into(),
            display_name: "Ghost".into(),
        });
        participant.player_id = Some(RemoteId::new("remote-ghost"));
        t.participants.push(participant);

        let snapshot = t.to_snapshot();
        let (restored, report) =
            Tournament::from_snapshot(snapshot, TournamentConfig::default(), |_| None).unwrap();

        assert!(restored.participants.is_empty());
        assert_eq!(report.lost_participants, vec![RemoteId::new("remote-ghost")]);
    }
}
