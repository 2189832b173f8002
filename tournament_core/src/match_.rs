//! two-player engagement lifecycle (spec.md §3, §4.3).

use crate::identifiers::{ChannelHandle, MatchId, ParticipantId, RemoteId, StreamerId};
use crate::timing::TzInstant;
use crate::top8::Top8;
use serde::{Deserialize, Serialize};

/// match-level phase, distinct from the tournament-level phase.
///
/// Invariants (spec.md §3): exactly one of
/// - `Pending`: no channel.
/// - `Ongoing`: channel + `start_time` set.
/// - `OnHold`: channel may exist, `start_time` cleared.
/// - `Done`: `end_time` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Pending,
    Ongoing,
    OnHold,
    Done,
}

/// overtime-warning tri-state: no warning sent yet, a first warning sent at
/// a given instant, or the time-out warning already sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Warned {
    None,
    FirstWarnAt(TzInstant),
    TimeoutWarnSent,
}

impl Warned {
    pub fn is_none(&self) -> bool {
        matches!(self, Warned::None)
    }
}

/// a two-player engagement. `round` is signed: positive is the winners
/// side, negative the losers side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub remote_id: RemoteId,
    pub round: i32,
    pub set: u64,
    pub player1: ParticipantId,
    pub player2: ParticipantId,
    pub phase: MatchPhase,
    pub underway: bool,
    pub channel: Option<ChannelHandle>,
    pub start_time: Option<TzInstant>,
    pub end_time: Option<TzInstant>,
    pub warned: Warned,
    pub streamer: Option<StreamerId>,
    pub winner: Option<ParticipantId>,
    /// id of the pinned message in the match channel, if any (spec.md §6).
    pub message: Option<String>,
    /// cached once at creation time, since `top_8` boundaries are fixed for
    /// the lifetime of the tournament once the bracket has started.
    pub is_top8: bool,
    pub is_bo5: bool,
    /// set true once AFK has been evaluated for this match; also set true
    /// pre-emptively for top-8 matches so they are never auto-DQ'd.
    pub checked_dq: bool,
}

impl Match {
    pub fn new(
        remote_id: RemoteId,
        round: i32,
        set: u64,
        player1: ParticipantId,
        player2: ParticipantId,
        top8: &Top8,
    ) -> Self {
        let is_top8 = top8.contains(round);
        let is_bo5 = top8.is_bo5(round);
        Self {
            id: MatchId::new(),
            remote_id,
            round,
            set,
            player1,
            player2,
            phase: MatchPhase::Pending,
            underway: false,
            channel: None,
            start_time: None,
            end_time: None,
            warned: Warned::None,
            streamer: None,
            winner: None,
            message: None,
            is_top8,
            is_bo5,
            // top-8 matches are never auto-DQ'd.
            checked_dq: is_top8,
        }
    }

    pub fn round_name(&self) -> String {
        if self.round > 0 {
            format!("winners round {}", self.round)
        } else if self.round < 0 {
            format!("losers round {}", -self.round)
        } else {
            "grand final".to_string()
        }
    }

    pub fn has_player(&self, participant: ParticipantId) -> bool {
        self.player1 == participant || self.player2 == participant
    }

    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        if self.player1 == participant {
            Some(self.player2)
        } else if self.player2 == participant {
            Some(self.player1)
        } else {
            None
        }
    }

    pub fn duration(&self, now: TzInstant) -> Option<std::time::Duration> {
        self.start_time.map(|s| s.elapsed_since(now))
    }
}
