//! the `Match` state machine (spec.md §4.3).
//!
//! Transitions live here rather than on `Match` itself because most of them
//! need to consult sibling entities (the streamer queue, the opponent's
//! remote id) that only the owning `Tournament` can resolve — the same
//! "owns by value, references by id" shape used throughout this crate
//! (see the module doc on `tournament::mod`).

use super::Tournament;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{ChannelHandle, MatchId, ParticipantId};
use crate::match_::{MatchPhase, Warned};
use crate::ports::provider::{encode_scores_csv, ProviderPort};
use crate::streamer::StreamerEntry;
use crate::timing::TzInstant;

/// the phase a successful `launch_match` landed the match in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Ongoing,
    OnHold,
}

/// the forfeit/disqualification wire score: winner-first convention,
/// always `-1-0` regardless of which side actually forfeited (the negative
/// score is the DQ marker itself, not a real game result).
pub(crate) const FORFEIT_SCORES_CSV: &str = "-1-0";

/// the same forfeit marker with the sides swapped, used by the reconciler
/// when it is the player2-equivalent side of a remote-only match that
/// resolved locally (spec.md §4.2, "immediately score-force... in the
/// opposite side's favour").
pub(crate) const FORFEIT_SCORES_CSV_REVERSED: &str = "0--1";

fn invariant(msg: impl Into<String>) -> EngineError {
    EngineError::Invariant(msg.into())
}

impl Tournament {
    /// whether `match_id`'s streamer already has a different, unfinished
    /// match ahead of it in queue order — the condition that sends `launch`
    /// to `ON_HOLD` instead of `ONGOING` (spec.md §4.3).
    fn streamer_blocks_launch(&self, match_id: MatchId) -> bool {
        let Some(m) = self.find_match(match_id) else {
            return false;
        };
        let Some(streamer_id) = m.streamer else {
            return false;
        };
        let Some(streamer) = self.find_streamer(streamer_id) else {
            return false;
        };
        for entry in &streamer.matches {
            let StreamerEntry::Match(id) = entry else {
                continue;
            };
            if *id == match_id {
                return false;
            }
            if let Some(other) = self.find_match(*id) {
                if matches!(other.phase, MatchPhase::Ongoing | MatchPhase::OnHold) {
                    return true;
                }
            }
        }
        false
    }

    /// `PENDING -> ONGOING` (normal), or `PENDING -> ON_HOLD` when a
    /// streamer is assigned and another of their matches is already
    /// running. The caller provisions the channel beforehand; passing
    /// `channel = None` leaves the match in degraded "no channel" mode
    /// (spec.md §4.3, §7) without failing the transition.
    pub fn launch_match(
        &mut self,
        id: MatchId,
        channel: Option<ChannelHandle>,
        now: TzInstant,
    ) -> EngineResult<LaunchTarget> {
        let on_hold = self.streamer_blocks_launch(id);
        let m = self
            .find_match_mut(id)
            .ok_or_else(|| invariant("launch_match: unknown match"))?;
        if m.phase != MatchPhase::Pending {
            return Err(invariant(format!(
                "launch_match: match {id:?} is not pending"
            )));
        }
        m.channel = channel;
        if on_hold {
            m.phase = MatchPhase::OnHold;
            Ok(LaunchTarget::OnHold)
        } else {
            m.phase = MatchPhase::Ongoing;
            m.underway = true;
            m.start_time = Some(now);
            Ok(LaunchTarget::Ongoing)
        }
    }

    /// `ON_HOLD -> ONGOING`: the streamer queue's turn has come around to
    /// this match.
    pub fn start_stream(&mut self, id: MatchId, now: TzInstant) -> EngineResult<()> {
        let m = self
            .find_match_mut(id)
            .ok_or_else(|| invariant("start_stream: unknown match"))?;
        if m.phase != MatchPhase::OnHold {
            return Err(invariant(format!(
                "start_stream: match {id:?} is not on hold"
            )));
        }
        m.phase = MatchPhase::Ongoing;
        m.underway = true;
        m.start_time = Some(now);
        Ok(())
    }

    /// `ONGOING -> ON_HOLD`: a new match was queued ahead of this one on
    /// its streamer's list.
    pub fn stream_queue_add_pause(&mut self, id: MatchId) -> EngineResult<()> {
        let m = self
            .find_match_mut(id)
            .ok_or_else(|| invariant("stream_queue_add_pause: unknown match"))?;
        if m.phase != MatchPhase::Ongoing {
            return Err(invariant(format!(
                "stream_queue_add_pause: match {id:?} is not ongoing"
            )));
        }
        m.phase = MatchPhase::OnHold;
        m.start_time = None;
        m.underway = false;
        Ok(())
    }

    /// the streamer dropped this match: `ON_HOLD -> ONGOING`, or, if the
    /// match was already the streamer's live `ONGOING` head, just restarts
    /// its clock. AFK checks resume unless the match is top-8 (sticky
    /// policy, spec.md §4.3); mirrors the unconditional restart in
    /// `examples/original_source/tournaments/core/base/match.py`'s
    /// `cancel_stream`/`_start`, which runs regardless of the match's prior
    /// phase.
    pub fn cancel_stream(&mut self, id: MatchId, now: TzInstant) -> EngineResult<()> {
        let is_top8 = self
            .find_match(id)
            .ok_or_else(|| invariant("cancel_stream: unknown match"))?
            .is_top8;
        let m = self.find_match_mut(id).expect("checked above");
        if !matches!(m.phase, MatchPhase::OnHold | MatchPhase::Ongoing) {
            return Err(invariant(format!(
                "cancel_stream: match {id:?} is not on hold or ongoing"
            )));
        }
        m.phase = MatchPhase::Ongoing;
        m.underway = true;
        m.start_time = Some(now);
        m.streamer = None;
        if !is_top8 {
            m.checked_dq = false;
        }
        Ok(())
    }

    /// `DONE -> ONGOING`: the bracket operator reverted a score. Reuses the
    /// existing channel handle if the caller still has one open.
    pub fn relaunch(&mut self, id: MatchId, now: TzInstant) -> EngineResult<()> {
        let is_top8 = self
            .find_match(id)
            .ok_or_else(|| invariant("relaunch: unknown match"))?
            .is_top8;
        let m = self.find_match_mut(id).expect("checked above");
        if m.phase != MatchPhase::Done {
            return Err(invariant(format!("relaunch: match {id:?} is not done")));
        }
        m.phase = MatchPhase::Ongoing;
        m.underway = true;
        m.start_time = Some(now);
        m.end_time = None;
        m.winner = None;
        m.warned = Warned::None;
        m.checked_dq = is_top8;
        Ok(())
    }

    /// `* -> DONE` with the winner computed as arg-max on scores (player1
    /// wins ties). Uploads to the remote when `upload` is set.
    pub async fn end_match(
        &mut self,
        provider: &dyn ProviderPort,
        id: MatchId,
        score1: u32,
        score2: u32,
        now: TzInstant,
        upload: bool,
    ) -> EngineResult<ParticipantId> {
        let (remote_id, player1, player2) = {
            let m = self
                .find_match(id)
                .ok_or_else(|| invariant("end_match: unknown match"))?;
            (m.remote_id.clone(), m.player1, m.player2)
        };
        let winner = if score2 > score1 { player2 } else { player1 };

        if upload {
            let winner_remote = self
                .find_participant(winner)
                .and_then(|p| p.player_id.clone())
                .ok_or_else(|| invariant("end_match: winner has no remote id"))?;
            let (winner_score, loser_score) = if score2 > score1 {
                (score2, score1)
            } else {
                (score1, score2)
            };
            let csv = encode_scores_csv(winner_score, loser_score);
            provider.update_match(&remote_id, &csv, &winner_remote).await?;
        }

        self.finish_match(id, Some(winner), now);
        Ok(winner)
    }

    /// any phase `-> DONE`, without touching scores: used when an upstream
    /// bracket change invalidates a match outright (spec.md §4.2
    /// reconciliation, local `ONGOING` / remote `pending`). Returns the
    /// channel handle, if any, for the caller to delete and for both
    /// players to be notified.
    pub fn force_end(&mut self, id: MatchId, now: TzInstant) -> EngineResult<Option<ChannelHandle>> {
        let channel = self
            .find_match(id)
            .ok_or_else(|| invariant("force_end: unknown match"))?
            .channel
            .clone();
        self.finish_match(id, None, now);
        Ok(channel)
    }

    /// disqualifies `player`; the opponent wins by forfeit. `upload`
    /// controls whether the result is pushed to the remote — callers pass
    /// `false` when the match never had a remote counterpart yet (e.g. an
    /// unregister during the pre-upload registration window).
    pub async fn disqualify(
        &mut self,
        provider: &dyn ProviderPort,
        id: MatchId,
        player: ParticipantId,
        now: TzInstant,
        upload: bool,
    ) -> EngineResult<ParticipantId> {
        let (player1, player2, remote_id) = {
            let m = self
                .find_match(id)
                .ok_or_else(|| invariant("disqualify: unknown match"))?;
            (m.player1, m.player2, m.remote_id.clone())
        };
        let winner = if player1 == player { player2 } else { player1 };

        if upload {
            if let Some(winner_remote) = self.find_participant(winner).and_then(|p| p.player_id.clone()) {
                provider
                    .update_match(&remote_id, FORFEIT_SCORES_CSV, &winner_remote)
                    .await?;
            }
        }

        self.finish_match(id, Some(winner), now);
        Ok(winner)
    }

    /// `ONGOING -> DONE` with a forfeit score, always uploaded — the
    /// self-reported counterpart to `disqualify` (spec.md §4.3).
    pub async fn forfeit(
        &mut self,
        provider: &dyn ProviderPort,
        id: MatchId,
        player: ParticipantId,
        now: TzInstant,
    ) -> EngineResult<ParticipantId> {
        if self.find_match(id).map(|m| m.phase) != Some(MatchPhase::Ongoing) {
            return Err(invariant(format!("forfeit: match {id:?} is not ongoing")));
        }
        self.disqualify(provider, id, player, now, true).await
    }

    fn finish_match(&mut self, id: MatchId, winner: Option<ParticipantId>, now: TzInstant) {
        if let Some(m) = self.find_match_mut(id) {
            m.phase = MatchPhase::Done;
            m.underway = false;
            m.end_time = Some(now);
            m.winner = winner.or(m.winner);
        }
        for p in &mut self.participants {
            if p.match_id == Some(id) {
                p.match_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use crate::identifiers::{RemoteId, UserRef};
    use crate::top8::Top8;

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

    fn add_participant(t: &mut Tournament, id: &str) -> ParticipantId {
        let p = crate::participant::Participant::new(UserRef {
            id: id.into(),
            display_name: id.into(),
        });
        let pid = p.id;
        t.participants.push(p);
        pid
    }

    fn add_match(t: &mut Tournament, p1: ParticipantId, p2: ParticipantId) -> MatchId {
        let m = crate::match_::Match::new(RemoteId::new("m1"), 1, 1, p1, p2, &Top8::default());
        let id = m.id;
        t.matches.push(m);
        id
    }

    #[test]
    fn launch_sets_ongoing_without_streamer() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a");
        let p2 = add_participant(&mut t, "b");
        let mid = add_match(&mut t, p1, p2);

        let target = t.launch_match(mid, None, ts(10_100)).unwrap();
        assert_eq!(target, LaunchTarget::Ongoing);
        let m = t.find_match(mid).unwrap();
        assert_eq!(m.phase, MatchPhase::Ongoing);
        assert!(m.underway);
        assert_eq!(m.start_time, Some(ts(10_100)));
    }

    #[test]
    fn force_end_clears_participant_back_reference() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a");
        let p2 = add_participant(&mut t, "b");
        let mid = add_match(&mut t, p1, p2);
        t.find_participant_mut(p1).unwrap().match_id = Some(mid);
        t.find_participant_mut(p2).unwrap().match_id = Some(mid);
        t.launch_match(mid, None, ts(10_100)).unwrap();

        t.force_end(mid, ts(10_200)).unwrap();

        let m = t.find_match(mid).unwrap();
        assert_eq!(m.phase, MatchPhase::Done);
        assert_eq!(m.end_time, Some(ts(10_200)));
        assert!(t.find_participant(p1).unwrap().match_id.is_none());
        assert!(t.find_participant(p2).unwrap().match_id.is_none());
    }

    #[test]
    fn stream_queue_add_pause_requires_ongoing() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a");
        let p2 = add_participant(&mut t, "b");
        let mid = add_match(&mut t, p1, p2);

        assert!(t.stream_queue_add_pause(mid).is_err());
    }
}
