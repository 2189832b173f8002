//! `ProviderPort`: the abstract remote bracket provider (spec.md §4.1, §6).
//!
//! Transport, auth and retries are delegated to the concrete adapter (e.g.
//! `tournament_provider_challonge`); the engine only consumes this
//! interface, grounded on `app_core::ports::database::DatabasePort`'s
//! async-trait port shape.

use crate::errors::ProviderError;
use crate::identifiers::RemoteId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteMatchState {
    Open,
    Pending,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTournamentInfo {
    pub id: RemoteId,
    pub name: String,
    pub game: String,
    pub url: String,
    pub limit: Option<u32>,
    pub status: String,
    /// UTC epoch seconds of the scheduled start.
    pub start_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteParticipant {
    pub id: RemoteId,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMatch {
    pub id: RemoteId,
    pub round: i32,
    pub set: u64,
    pub state: RemoteMatchState,
    pub player1_id: Option<RemoteId>,
    pub player2_id: Option<RemoteId>,
    pub underway_at: Option<i64>,
    /// "winner-score-first" wire convention, dash separated (e.g. "3-1").
    pub scores_csv: Option<String>,
    pub winner_id: Option<RemoteId>,
}

/// abstract remote bracket provider, consumed by the engine.
#[async_trait]
pub trait ProviderPort: Send + Sync {
    async fn show_tournament(&self, tournament_ref: &str) -> ProviderResult<RemoteTournamentInfo>;
    async fn start_tournament(&self) -> ProviderResult<()>;
    async fn finalize_tournament(&self) -> ProviderResult<()>;
    async fn reset_tournament(&self) -> ProviderResult<()>;

    async fn list_participants(&self) -> ProviderResult<Vec<RemoteParticipant>>;
    async fn create_participant(&self, name: &str, seed: u32) -> ProviderResult<RemoteId>;
    async fn destroy_participant(&self, id: &RemoteId) -> ProviderResult<()>;

    async fn list_matches(&self) -> ProviderResult<Vec<RemoteMatch>>;
    async fn update_match(
        &self,
        id: &RemoteId,
        scores_csv: &str,
        winner_id: &RemoteId,
    ) -> ProviderResult<()>;
    async fn mark_match_underway(&self, id: &RemoteId) -> ProviderResult<()>;
    async fn unmark_match_underway(&self, id: &RemoteId) -> ProviderResult<()>;
}

/// the dash-separated wire convention for match scores: the winner's score
/// is reported first. The engine always converts at this boundary to the
/// player1/player2 convention used internally (spec.md §4.2, §6).
pub fn encode_scores_csv(winner_score: u32, loser_score: u32) -> String {
    format!("{winner_score}-{loser_score}")
}

/// parse a `scores_csv` string into `(first, second)` scores in wire order
/// (winner first). Returns `None` if the string is malformed.
pub fn parse_scores_csv(raw: &str) -> Option<(i32, i32)> {
    // scores can be negative (forfeits use "-1-0"/"0--1"), so split on the
    // middle separator rather than naive `split('-')`.
    let bytes = raw.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b'-' {
            let (left, right) = raw.split_at(i);
            let right = &right[1..];
            if let (Ok(a), Ok(b)) = (left.parse::<i32>(), right.parse::<i32>()) {
                return Some((a, b));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_scores() {
        assert_eq!(parse_scores_csv("3-1"), Some((3, 1)));
    }

    #[test]
    fn parses_forfeit_scores() {
        assert_eq!(parse_scores_csv("-1-0"), Some((-1, 0)));
        assert_eq!(parse_scores_csv("0--1"), Some((0, -1)));
    }

    #[test]
    fn encodes_scores() {
        assert_eq!(encode_scores_csv(3, 1), "3-1");
    }
}
