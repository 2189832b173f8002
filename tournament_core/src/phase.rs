//! tournament-level and sub-phase state machines (spec.md §3, §4.2).

use serde::{Deserialize, Serialize};

/// tournament-level phase. Monotonic except `Register` may re-enter on a
/// second registration opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentPhase {
    Pending,
    Register,
    Awaiting,
    Ongoing,
    Done,
}

/// phase of the registration or check-in sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPhase {
    /// not scheduled; must be started manually.
    Manual,
    Pending,
    Ongoing,
    /// closed once, scheduled to reopen.
    OnHold,
    Done,
}

/// the named scheduler events that can be individually skipped via
/// `ignored_events` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    RegisterStart,
    RegisterSecondStart,
    RegisterStop,
    CheckinStart,
    CheckinStop,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::RegisterStart => "register_start",
            EventName::RegisterSecondStart => "register_second_start",
            EventName::RegisterStop => "register_stop",
            EventName::CheckinStart => "checkin_start",
            EventName::CheckinStop => "checkin_stop",
        }
    }

    /// evaluation order when two events share a timestamp (spec.md §4.2).
    pub fn evaluation_order() -> [EventName; 5] {
        [
            EventName::RegisterStart,
            EventName::CheckinStop,
            EventName::CheckinStart,
            EventName::RegisterSecondStart,
            EventName::RegisterStop,
        ]
    }
}
