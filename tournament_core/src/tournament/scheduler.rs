//! the timestamp-driven event scheduler (spec.md §3, §4.2).
//!
//! Each tick the runtime calls [`Tournament::due_events`] once with the
//! current time; the engine never schedules wakeups itself, mirroring
//! `cr_single_instance`'s poll-driven `LoopTask` rather than a timer-per-event
//! design.

use super::Tournament;
use crate::phase::{EventName, SubPhase, TournamentPhase};
use crate::timing::{CheckinReminder, TzInstant};
use std::time::Duration;

impl Tournament {
    /// every event whose trigger time has passed and that has not yet been
    /// consumed, in the tie-break order defined by
    /// [`EventName::evaluation_order`], skipping anything in
    /// `ignored_events`.
    pub fn due_events(&self, now: TzInstant) -> Vec<EventName> {
        EventName::evaluation_order()
            .into_iter()
            .filter(|ev| !self.ignored_events.contains(ev))
            .filter(|ev| self.is_event_due(*ev, now))
            .collect()
    }

    fn is_event_due(&self, event: EventName, now: TzInstant) -> bool {
        match event {
            EventName::RegisterStart => {
                (self.register_phase == SubPhase::Manual || self.register_phase == SubPhase::Pending)
                    && !self.register.start.is_after(now)
                    && self.phase != TournamentPhase::Ongoing
                    && self.phase != TournamentPhase::Done
            }
            EventName::RegisterSecondStart => {
                self.register_phase == SubPhase::OnHold
                    && self
                        .register
                        .second_start
                        .map(|t| !t.is_after(now))
                        .unwrap_or(false)
            }
            EventName::RegisterStop => {
                self.register_phase == SubPhase::Ongoing && !self.register.stop.is_after(now)
            }
            EventName::CheckinStart => {
                (self.checkin_phase == SubPhase::Manual || self.checkin_phase == SubPhase::Pending)
                    && !self.checkin.start.is_after(now)
            }
            EventName::CheckinStop => {
                self.checkin_phase == SubPhase::Ongoing && !self.checkin.stop.is_after(now)
            }
        }
    }

    /// applies one due event's transition. Called by the runtime once per
    /// entry returned from [`Tournament::due_events`].
    pub fn apply_event(&mut self, event: EventName) -> crate::errors::EngineResult<()> {
        match event {
            EventName::RegisterStart | EventName::RegisterSecondStart => self.start_registration(),
            EventName::RegisterStop => self.end_registration(),
            EventName::CheckinStart => self.start_checkin(),
            EventName::CheckinStop => self.end_checkin().map(|_| ()),
        }
    }

    /// drains every reminder whose trigger time (`checkin.stop` minus its
    /// offset) has passed, for the caller to notify (spec.md §4.2
    /// `startCheckin`). A reminder fires at most once since it is removed
    /// from `checkin_reminders` as soon as it's due.
    pub fn due_checkin_reminders(&mut self, now: TzInstant) -> Vec<CheckinReminder> {
        if self.checkin_phase != SubPhase::Ongoing {
            return Vec::new();
        }
        let mut due = Vec::new();
        self.checkin_reminders.retain(|reminder| {
            let at = self.checkin.stop.sub(Duration::from_secs((reminder.minutes_before_stop * 60) as u64));
            if !at.is_after(now) {
                due.push(*reminder);
                false
            } else {
                true
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use crate::identifiers::RemoteId;
    use crate::timing::{CheckinTiming, RegisterTiming};
    use crate::Tournament;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    fn ongoing_checkin() -> Tournament {
        let mut t = Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap();
        t.register = RegisterTiming { start: ts(0), second_start: None, stop: ts(0) };
        t.checkin = CheckinTiming { start: ts(0), stop: ts(1_800) };
        t.checkin_phase = SubPhase::Ongoing;
        t.checkin_reminders = vec![
            CheckinReminder { minutes_before_stop: 15, send_dm: false },
            CheckinReminder { minutes_before_stop: 10, send_dm: true },
            CheckinReminder { minutes_before_stop: 5, send_dm: false },
        ];
        t
    }

    #[test]
    fn reminders_fire_once_and_only_when_due() {
        let mut t = ongoing_checkin();
        // stop is at 1_800; -15min reminder is due at 900.
        assert!(t.due_checkin_reminders(ts(800)).is_empty());
        let due = t.due_checkin_reminders(ts(900));
        assert_eq!(due, vec![CheckinReminder { minutes_before_stop: 15, send_dm: false }]);
        // doesn't fire twice even if polled again at the same instant.
        assert!(t.due_checkin_reminders(ts(900)).is_empty());
        assert_eq!(t.checkin_reminders.len(), 2);
    }

    #[test]
    fn reminders_do_not_fire_outside_checkin() {
        let mut t = ongoing_checkin();
        t.checkin_phase = SubPhase::Done;
        assert!(t.due_checkin_reminders(ts(1_800)).is_empty());
    }
}
