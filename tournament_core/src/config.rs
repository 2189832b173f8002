//! per-tournament configuration surface (spec.md §6).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// registration window configuration, offsets in seconds before
/// `tournament_start`. A value of 0 means "manual / disabled".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    pub opening: u64,
    pub second_opening: u64,
    pub closing: u64,
}

/// check-in window configuration, offsets in seconds before
/// `tournament_start`. A value of 0 means "manual / disabled".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckinConfig {
    pub opening: u64,
    pub closing: u64,
}

/// a pair of overtime-warning thresholds for a given match format. Either
/// side being `None` disables that warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WarnThresholds {
    pub first: Option<Duration>,
    pub second: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeUntilWarn {
    pub bo3: WarnThresholds,
    pub bo5: WarnThresholds,
}

/// optional seeding source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RankingConfig {
    pub league_name: Option<String>,
    pub league_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub registration: RegistrationConfig,
    pub checkin: CheckinConfig,
    pub autostop_register: bool,
    /// signed bo5-boundary offset
    pub start_bo5: i32,
    /// AFK threshold; `None` disables auto-DQ
    pub delay: Option<Duration>,
    pub time_until_warn: TimeUntilWarn,
    pub ranking: RankingConfig,
    /// presentation-only strings, carried through verbatim
    pub baninfo: String,
    pub stages: String,
    pub counterpicks: String,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            registration: RegistrationConfig {
                opening: 0,
                second_opening: 0,
                closing: 0,
            },
            checkin: CheckinConfig {
                opening: 0,
                closing: 0,
            },
            autostop_register: false,
            start_bo5: 0,
            delay: None,
            time_until_warn: TimeUntilWarn::default(),
            ranking: RankingConfig::default(),
            baninfo: String::new(),
            stages: String::new(),
            counterpicks: String::new(),
        }
    }
}
