//! a bracket-player record bound to a chat user (spec.md §3).

use crate::identifiers::{MatchId, ParticipantId, RemoteId, UserRef};
use serde::{Deserialize, Serialize};

/// Invariants (spec.md §3):
/// - if `player_id` is set, the participant exists on the remote bracket.
/// - if `match_id` is set, that match's `player1`/`player2` equals this
///   participant's id.
/// - `checked_in` is monotonic within one check-in window, reset on
///   unregister.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub user: UserRef,
    pub player_id: Option<RemoteId>,
    pub elo: Option<i64>,
    pub checked_in: bool,
    /// has the user spoken in their match channel since the match started
    pub spoke: bool,
    pub match_id: Option<MatchId>,
}

impl Participant {
    pub fn new(user: UserRef) -> Self {
        Self {
            id: ParticipantId::new(),
            user,
            player_id: None,
            elo: None,
            checked_in: false,
            spoke: false,
            match_id: None,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.player_id.is_some()
    }
}
