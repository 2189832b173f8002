//! persisted-state DTOs mirroring the JSON layout of spec.md §6.
//!
//! Grounded on `db_postgres::tournament_base`'s row <-> domain mapping
//! (`DbTournamentBase`/`WriteDbTournamentBase`), generalized from SQL rows
//! to JSON documents since persistence itself is delegated to an external
//! configuration store (spec.md §1 Non-goals).

use crate::identifiers::RemoteId;
use crate::match_::Warned;
use crate::phase::{SubPhase, TournamentPhase};
use crate::timing::CheckinReminder;
use crate::top8::Top8;
use serde::{Deserialize, Serialize};

/// bumped whenever the shape of this layout changes in a
/// backward-incompatible way.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub user_id: String,
    pub player_id: Option<RemoteId>,
    pub spoke: bool,
    pub checked_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub round: i32,
    pub set: u64,
    pub id: RemoteId,
    pub underway: bool,
    pub player1: String,
    pub player2: String,
    pub channel: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub phase: String,
    pub checked_dq: bool,
    pub warned: WarnedSnapshot,
    pub message: Option<String>,
}

/// `warned` is encoded as one of `null | true | epoch_seconds` (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WarnedSnapshot {
    None,
    TimeoutWarnSent(bool),
    FirstWarnAt(i64),
}

impl From<Warned> for WarnedSnapshot {
    fn from(w: Warned) -> Self {
        match w {
            Warned::None => WarnedSnapshot::None,
            Warned::FirstWarnAt(t) => WarnedSnapshot::FirstWarnAt(t.epoch_seconds()),
            Warned::TimeoutWarnSent => WarnedSnapshot::TimeoutWarnSent(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamerSnapshot {
    pub owner: String,
    pub channel: String,
    pub room_id: Option<String>,
    pub room_code: Option<String>,
    /// queue entries encoded as set numbers (materialized matches are
    /// re-resolved against `matches[]` on load).
    pub matches: Vec<u64>,
    pub current_match: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub schema_version: u32,
    pub id: RemoteId,
    pub name: String,
    pub game: String,
    pub url: String,
    pub limit: Option<u32>,
    pub status: String,
    pub tournament_start: (i64, i32),
    pub config_name: String,
    pub phase: String,
    pub register_phase: String,
    pub checkin_phase: String,
    pub ignored_events: Vec<String>,
    pub top_8: Top8,
    pub participants: Vec<ParticipantSnapshot>,
    pub matches: Vec<MatchSnapshot>,
    pub streamers: Vec<StreamerSnapshot>,
    pub winner_categories: Vec<String>,
    pub loser_categories: Vec<String>,
    pub checkin_reminders: Vec<CheckinReminder>,
    pub register_message_id: Option<String>,
}

pub fn phase_to_str(p: TournamentPhase) -> &'static str {
    match p {
        TournamentPhase::Pending => "PENDING",
        TournamentPhase::Register => "REGISTER",
        TournamentPhase::Awaiting => "AWAITING",
        TournamentPhase::Ongoing => "ONGOING",
        TournamentPhase::Done => "DONE",
    }
}

pub fn sub_phase_to_str(p: SubPhase) -> &'static str {
    match p {
        SubPhase::Manual => "MANUAL",
        SubPhase::Pending => "PENDING",
        SubPhase::Ongoing => "ONGOING",
        SubPhase::OnHold => "ON_HOLD",
        SubPhase::Done => "DONE",
    }
}
