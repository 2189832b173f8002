//! JSON shapes of the Challonge v1 REST API and their conversion into the
//! engine's `ports::provider` types (spec.md §4.1, §6).
//!
//! Every Challonge resource is wrapped in a single-key envelope (`{"match":
//! {...}}`), and every id is a JSON integer; the engine's [`RemoteId`] is a
//! plain string, so conversion happens at this boundary.

use serde::{Deserialize, Serialize};
use tournament_core::ports::provider::{RemoteMatch, RemoteMatchState, RemoteParticipant, RemoteTournamentInfo};
use tournament_core::RemoteId;

#[derive(Debug, Deserialize)]
pub struct TournamentEnvelope {
    pub tournament: TournamentWire,
}

#[derive(Debug, Deserialize)]
pub struct TournamentWire {
    pub id: i64,
    pub name: String,
    pub game_name: Option<String>,
    pub url: String,
    pub signup_cap: Option<u32>,
    pub state: String,
    /// RFC3339 timestamp; `None` for tournaments with no scheduled start.
    pub start_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<TournamentWire> for RemoteTournamentInfo {
    fn from(w: TournamentWire) -> Self {
        RemoteTournamentInfo {
            id: RemoteId::new(w.id.to_string()),
            name: w.name,
            game: w.game_name.unwrap_or_default(),
            url: w.url,
            limit: w.signup_cap,
            status: w.state,
            start_at: w.start_at.map(|t| t.timestamp()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ParticipantEnvelope {
    pub participant: ParticipantWire,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantWire {
    pub id: i64,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub active: bool,
}

impl From<ParticipantWire> for RemoteParticipant {
    fn from(w: ParticipantWire) -> Self {
        RemoteParticipant {
            id: RemoteId::new(w.id.to_string()),
            name: w.display_name.or(w.name).unwrap_or_default(),
            active: w.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantCreateEnvelope<'a> {
    pub participant: ParticipantCreateWire<'a>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantCreateWire<'a> {
    pub name: &'a str,
    pub seed: u32,
}

#[derive(Debug, Deserialize)]
pub struct MatchEnvelope {
    #[serde(rename = "match")]
    pub match_: MatchWire,
}

#[derive(Debug, Deserialize)]
pub struct MatchWire {
    pub id: i64,
    pub round: i32,
    pub suggested_play_order: Option<u64>,
    pub state: String,
    pub player1_id: Option<i64>,
    pub player2_id: Option<i64>,
    pub underway_at: Option<chrono::DateTime<chrono::Utc>>,
    pub scores_csv: Option<String>,
    pub winner_id: Option<i64>,
}

impl From<MatchWire> for RemoteMatch {
    fn from(w: MatchWire) -> Self {
        RemoteMatch {
            id: RemoteId::new(w.id.to_string()),
            round: w.round,
            set: w.suggested_play_order.unwrap_or(0),
            state: parse_match_state(&w.state),
            player1_id: w.player1_id.map(|id| RemoteId::new(id.to_string())),
            player2_id: w.player2_id.map(|id| RemoteId::new(id.to_string())),
            underway_at: w.underway_at.map(|t| t.timestamp()),
            scores_csv: w.scores_csv.filter(|s| !s.is_empty()),
            winner_id: w.winner_id.map(|id| RemoteId::new(id.to_string())),
        }
    }
}

fn parse_match_state(raw: &str) -> RemoteMatchState {
    match raw {
        "complete" => RemoteMatchState::Complete,
        "pending" => RemoteMatchState::Pending,
        // Challonge also reports "open" for the first playable round and
        // has no separate "in progress" state; treat anything else as open.
        _ => RemoteMatchState::Open,
    }
}

#[derive(Debug, Serialize)]
pub struct MatchUpdateEnvelope<'a> {
    #[serde(rename = "match")]
    pub match_: MatchUpdateWire<'a>,
}

#[derive(Debug, Serialize)]
pub struct MatchUpdateWire<'a> {
    pub scores_csv: &'a str,
    pub winner_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_tournament_envelope() {
        let raw = r#"{"tournament":{"id":42,"name":"Cup","game_name":"SC2","url":"cup",
            "signup_cap":32,"state":"pending","start_at":"2026-01-01T00:00:00Z"}}"#;
        let env: TournamentEnvelope = serde_json::from_str(raw).unwrap();
        let info: RemoteTournamentInfo = env.tournament.into();
        assert_eq!(info.id, RemoteId::new("42"));
        assert_eq!(info.limit, Some(32));
        assert_eq!(info.status, "pending");
    }

    #[test]
    fn decodes_a_match_envelope_with_scores() {
        let raw = r#"{"match":{"id":7,"round":1,"suggested_play_order":3,"state":"complete",
            "player1_id":1,"player2_id":2,"underway_at":null,"scores_csv":"3-1","winner_id":1}}"#;
        let env: MatchEnvelope = serde_json::from_str(raw).unwrap();
        let m: RemoteMatch = env.match_.into();
        assert_eq!(m.state, RemoteMatchState::Complete);
        assert_eq!(m.scores_csv.as_deref(), Some("3-1"));
        assert_eq!(m.winner_id, Some(RemoteId::new("1")));
    }

    #[test]
    fn blank_scores_csv_becomes_none() {
        let raw = r#"{"match":{"id":7,"round":1,"suggested_play_order":null,"state":"open",
            "player1_id":1,"player2_id":2,"underway_at":null,"scores_csv":"","winner_id":null}}"#;
        let env: MatchEnvelope = serde_json::from_str(raw).unwrap();
        let m: RemoteMatch = env.match_.into();
        assert_eq!(m.scores_csv, None);
        assert_eq!(m.state, RemoteMatchState::Open);
    }
}
