//! timing of a tournament and its matches
//!
//! Instants are always stored as UTC epoch seconds plus the original
//! timezone offset they were created with, so restoring a persisted
//! tournament reproduces the same wall-clock semantics (spec.md §6).

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// a UTC instant that remembers the offset it was authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TzInstant {
    epoch_seconds: i64,
    tz_offset_seconds: i32,
}

impl TzInstant {
    pub fn new(epoch_seconds: i64, tz_offset_seconds: i32) -> Self {
        Self {
            epoch_seconds,
            tz_offset_seconds,
        }
    }

    pub fn from_utc_now(tz_offset_seconds: i32) -> Self {
        Self::new(Utc::now().timestamp(), tz_offset_seconds)
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }

    pub fn tz_offset_seconds(&self) -> i32 {
        self.tz_offset_seconds
    }

    /// all comparisons use UTC; the offset is display-only.
    pub fn to_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.epoch_seconds, 0).unwrap_or_else(|| Utc::now())
    }

    pub fn to_local(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.tz_offset_seconds).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        self.to_utc().with_timezone(&offset)
    }

    pub fn add(&self, duration: Duration) -> Self {
        Self::new(
            self.epoch_seconds + duration.as_secs() as i64,
            self.tz_offset_seconds,
        )
    }

    pub fn sub(&self, duration: Duration) -> Self {
        Self::new(
            self.epoch_seconds - duration.as_secs() as i64,
            self.tz_offset_seconds,
        )
    }

    /// duration elapsed between `self` (earlier) and `now`; zero if `now`
    /// is not after `self`.
    pub fn elapsed_since(&self, now: TzInstant) -> Duration {
        let delta = now.epoch_seconds - self.epoch_seconds;
        if delta <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(delta as u64)
        }
    }

    pub fn is_before(&self, other: TzInstant) -> bool {
        self.epoch_seconds < other.epoch_seconds
    }

    pub fn is_after(&self, other: TzInstant) -> bool {
        self.epoch_seconds > other.epoch_seconds
    }
}

/// registration window, derived from `tournament_start` minus the
/// configured offsets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegisterTiming {
    pub start: TzInstant,
    pub second_start: Option<TzInstant>,
    pub stop: TzInstant,
}

/// check-in window, derived from `tournament_start` minus the configured
/// offsets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckinTiming {
    pub start: TzInstant,
    pub stop: TzInstant,
}

/// one scheduled reminder call during check-in: minutes before
/// `checkin.stop`, and whether it should DM unchecked participants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckinReminder {
    pub minutes_before_stop: i64,
    pub send_dm: bool,
}

/// the candidate reminder offsets relative to `checkin.stop` (spec.md
/// §4.2 `startCheckin`): -15 min (no DM), -10 min (DM), -5 min (no DM),
/// each included only if the check-in window is long enough to fit it.
const CHECKIN_REMINDER_CANDIDATES: [(i64, bool); 3] = [(15, false), (10, true), (5, false)];

/// computes the reminder schedule for a just-opened check-in window,
/// dropping any candidate whose offset would fall at or before
/// `checkin.start` (spec.md §4.2, §8 "Check-in window narrower than 1
/// minute").
pub fn compute_checkin_reminders(checkin: &CheckinTiming) -> Vec<CheckinReminder> {
    CHECKIN_REMINDER_CANDIDATES
        .iter()
        .filter_map(|(minutes, send_dm)| {
            let at = checkin.stop.sub(Duration::from_secs((*minutes * 60) as u64));
            if at.is_after(checkin.start) {
                Some(CheckinReminder {
                    minutes_before_stop: *minutes,
                    send_dm: *send_dm,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    #[test]
    fn a_half_hour_window_gets_all_three_reminders() {
        let checkin = CheckinTiming {
            start: ts(0),
            stop: ts(1_800),
        };
        let reminders = compute_checkin_reminders(&checkin);
        assert_eq!(
            reminders,
            vec![
                CheckinReminder { minutes_before_stop: 15, send_dm: false },
                CheckinReminder { minutes_before_stop: 10, send_dm: true },
                CheckinReminder { minutes_before_stop: 5, send_dm: false },
            ]
        );
    }

    #[test]
    fn a_narrow_window_drops_reminders_that_would_land_before_start() {
        let checkin = CheckinTiming {
            start: ts(0),
            stop: ts(420), // 7 minutes: only -5 fits strictly after start.
        };
        let reminders = compute_checkin_reminders(&checkin);
        assert_eq!(
            reminders,
            vec![CheckinReminder { minutes_before_stop: 5, send_dm: false }]
        );
    }
}
