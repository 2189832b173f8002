//! per-tick passes driven by the runtime: launching matches, AFK timeouts,
//! overtime warnings and the stream queue (spec.md §4.3, §4.4, §8).

use super::{Tournament, CATEGORY_CAPACITY, CHANNEL_DELETION_DELAY_SECS, MATCH_LAUNCH_BATCH};
use crate::errors::EngineResult;
use crate::identifiers::{ChannelHandle, MatchId, ParticipantId};
use crate::match_::{MatchPhase, Warned};
use crate::ports::notifier::{MatchChannelRoles, MatchNotifyKind, NotifierPort};
use crate::timing::TzInstant;
use std::time::Duration;

/// outcome of the AFK-timeout pass (spec.md §4.3, §8): matches where
/// exactly one player stayed silent (the caller still has to call
/// [`Tournament::disqualify`] for these, since that uploads to the
/// remote), matches dropped outright because both players stayed silent
/// (already force-ended by this pass — no remote upload makes sense for a
/// double no-show), and channels whose 5-minute post-match grace period
/// has elapsed and are ready to be deleted.
#[derive(Debug, Clone, Default)]
pub struct TimeoutReport {
    pub to_disqualify: Vec<(MatchId, ParticipantId)>,
    pub both_silent_dropped: Vec<MatchId>,
    pub channels_to_delete: Vec<ChannelHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct OvertimeReport {
    pub first_warned: Vec<MatchId>,
    pub timeout_warned: Vec<MatchId>,
}

/// outcome of the stream pass: matches promoted from `ON_HOLD` to
/// `ONGOING` because they reached the head of their streamer's queue.
#[derive(Debug, Clone, Default)]
pub struct StreamReport {
    pub started: Vec<MatchId>,
}

impl Tournament {
    /// opens chat channels for up to [`MATCH_LAUNCH_BATCH`] pending matches
    /// whose category still has capacity, returning the ones launched so
    /// the caller can open them through [`NotifierPort`].
    pub fn matches_to_launch(&self) -> Vec<MatchId> {
        self.matches
            .iter()
            .filter(|m| m.phase == MatchPhase::Pending && m.channel.is_none())
            .take(MATCH_LAUNCH_BATCH)
            .map(|m| m.id)
            .collect()
    }

    /// records the channel created for a match by the caller after it
    /// picked a category with free capacity (spec.md §4.3: at most
    /// [`CATEGORY_CAPACITY`] channels live per category), then runs the
    /// full `launch` transition (see `tournament::matches`), which also
    /// handles the streamer-queue-blocked case.
    pub fn mark_match_launched(
        &mut self,
        id: MatchId,
        channel: Option<ChannelHandle>,
        now: TzInstant,
    ) -> EngineResult<super::matches::LaunchTarget> {
        self.launch_match(id, channel, now)
    }

    /// how many channels a winner/loser category currently hosts, used by
    /// the caller to decide whether a new category must be created before
    /// launching more matches.
    pub fn category_load(&self, category_idx: usize, winners_side: bool) -> usize {
        let categories = if winners_side {
            &self.winner_categories
        } else {
            &self.loser_categories
        };
        let _ = categories.get(category_idx);
        self.matches
            .iter()
            .filter(|m| m.channel.is_some() && m.phase == MatchPhase::Ongoing)
            .filter(|m| (m.round > 0) == winners_side)
            .count()
            .min(CATEGORY_CAPACITY)
    }

    /// evaluates AFK disqualification for every launched, not-yet-checked
    /// match, and finds channels past their post-match deletion grace
    /// period. `checked_dq` is set true for top-8 matches at creation time
    /// so they are skipped here (spec.md §4.3).
    ///
    /// Per spec.md §4.3: "Disqualify silent players (both players silent
    /// → DQ both and drop the match)". A double no-show is dropped
    /// directly here via [`Tournament::force_end`] (no winner to upload);
    /// a single no-show is reported in `to_disqualify` for the caller to
    /// resolve through the async, provider-uploading
    /// [`Tournament::disqualify`].
    pub fn timeout_pass(&mut self, now: TzInstant) -> TimeoutReport {
        let mut report = TimeoutReport::default();
        let Some(delay) = self.config.delay else {
            return report;
        };

        let due: Vec<MatchId> = self
            .matches
            .iter()
            .filter(|m| !m.checked_dq && m.phase == MatchPhase::Ongoing)
            .filter(|m| m.start_time.map(|s| s.elapsed_since(now) >= delay).unwrap_or(false))
            .map(|m| m.id)
            .collect();

        for id in due {
            let Some((p1, p2)) = self.find_match(id).map(|m| (m.player1, m.player2)) else {
                continue;
            };
            if let Some(m) = self.find_match_mut(id) {
                m.checked_dq = true;
            }
            let p1_spoke = self.find_participant(p1).map(|p| p.spoke).unwrap_or(true);
            let p2_spoke = self.find_participant(p2).map(|p| p.spoke).unwrap_or(true);

            if !p1_spoke && !p2_spoke {
                let _ = self.force_end(id, now);
                report.both_silent_dropped.push(id);
            } else if !p1_spoke {
                report.to_disqualify.push((id, p1));
            } else if !p2_spoke {
                report.to_disqualify.push((id, p2));
            }
        }

        for m in &self.matches {
            if m.phase == MatchPhase::Done {
                if let Some(end) = m.end_time {
                    if end.elapsed_since(now) >= Duration::from_secs(CHANNEL_DELETION_DELAY_SECS) {
                        if let Some(channel) = &m.channel {
                            report.channels_to_delete.push(channel.clone());
                        }
                    }
                }
            }
        }
        report
    }

    /// evaluates overtime warnings against the bo3/bo5 thresholds
    /// configured for the tournament, advancing each match's [`Warned`]
    /// tri-state at most once per threshold (spec.md §4.3).
    pub fn overtime_pass(&mut self, now: TzInstant) -> OvertimeReport {
        let mut report = OvertimeReport::default();
        for m in &mut self.matches {
            if m.phase != MatchPhase::Ongoing {
                continue;
            }
            // spec.md §4.3: "for each ONGOING match without a streamer" —
            // streamed matches are paced by the streamer, not the clock.
            if m.streamer.is_some() {
                continue;
            }
            let Some(start) = m.start_time else { continue };
            let thresholds = if m.is_bo5 {
                self.config.time_until_warn.bo5
            } else {
                self.config.time_until_warn.bo3
            };
            let elapsed = start.elapsed_since(now);

            match m.warned {
                Warned::None => {
                    if let Some(first) = thresholds.first {
                        if elapsed >= first {
                            m.warned = Warned::FirstWarnAt(now);
                            report.first_warned.push(m.id);
                        }
                    }
                }
                Warned::FirstWarnAt(_) => {
                    if let Some(second) = thresholds.second {
                        if elapsed >= second {
                            m.warned = Warned::TimeoutWarnSent;
                            report.timeout_warned.push(m.id);
                        }
                    }
                }
                Warned::TimeoutWarnSent => {}
            }
        }
        report
    }

    /// updates every streamer's derived `current_match`, then promotes any
    /// `ON_HOLD` match that is now its streamer's head to `ONGOING` via
    /// `start_stream` (spec.md §4.2 "Stream pass").
    pub fn stream_pass(&mut self, now: TzInstant) -> StreamReport {
        let mut report = StreamReport::default();
        let streamer_ids: Vec<_> = self.streamers.iter().map(|s| s.id).collect();
        for sid in streamer_ids {
            let current = {
                let streamer = match self.find_streamer(sid) {
                    Some(s) => s,
                    None => continue,
                };
                streamer
                    .current_match(|id| self.matches.iter().find(|m| m.id == id))
                    .map(|m| m.id)
            };
            let Some(mid) = current else { continue };
            if self.find_match(mid).map(|m| m.phase) == Some(MatchPhase::OnHold) {
                if self.start_stream(mid, now).is_ok() {
                    report.started.push(mid);
                }
            }
        }
        report
    }

    /// increments the error budget and reports whether it has been
    /// exhausted (spec.md §7: 5-strikes loop cancellation).
    pub fn record_task_error(&mut self) -> bool {
        self.task_errors += 1;
        self.task_errors >= super::MAX_TASK_ERRORS
    }

    pub fn reset_task_errors(&mut self) {
        self.task_errors = 0;
    }

    /// forces `checked_dq = true` on every `ONGOING` match already past the
    /// AFK threshold, without disqualifying anyone. Called once by the
    /// runtime when a loop task resumes after a pause, so the first tick
    /// back doesn't disqualify every match that went silent while paused
    /// (spec.md §5 "Resume after pause").
    pub fn preempt_afk_on_resume(&mut self, now: TzInstant) -> usize {
        let Some(delay) = self.config.delay else {
            return 0;
        };
        let mut forced = 0;
        for m in &mut self.matches {
            if m.phase == MatchPhase::Ongoing
                && !m.checked_dq
                && m.start_time.map(|s| s.elapsed_since(now) >= delay).unwrap_or(false)
            {
                m.checked_dq = true;
                forced += 1;
            }
        }
        forced
    }
}

/// helper for callers driving [`Tournament::matches_to_launch`] through a
/// [`NotifierPort`], bundling the channel roles for a given match.
pub fn channel_roles(t: &Tournament, match_id: MatchId) -> Option<MatchChannelRoles> {
    let m = t.find_match(match_id)?;
    let p1 = t.find_participant(m.player1)?;
    let p2 = t.find_participant(m.player2)?;
    Some(MatchChannelRoles {
        player1: p1.user.clone(),
        player2: p2.user.clone(),
    })
}

pub async fn notify_warn(
    notifier: &dyn NotifierPort,
    match_id: MatchId,
    kind: MatchNotifyKind,
) {
    notifier
        .notify_match(match_id, kind, serde_json::Value::Null)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use crate::identifiers::{ParticipantId, RemoteId, UserRef};
    use crate::participant::Participant;
    use crate::top8::Top8;
    use std::time::Duration;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    fn sample_tournament() -> Tournament {
        let mut config = TournamentConfig::default();
        config.delay = Some(Duration::from_secs(900));
        Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            config,
            "default".into(),
        )
        .unwrap()
    }

    fn add_participant(t: &mut Tournament, id: &str, spoke: bool) -> ParticipantId {
        let mut p = Participant::new(UserRef {
            id: id.into(),
            display_name: id.into(),
        });
        p.spoke = spoke;
        let pid = p.id;
        t.participants.push(p);
        pid
    }

    fn add_ongoing_match(t: &mut Tournament, p1: ParticipantId, p2: ParticipantId, start: TzInstant) -> MatchId {
        let mut m = crate::match_::Match::new(RemoteId::new("m1"), 1, 1, p1, p2, &Top8::default());
        m.phase = MatchPhase::Ongoing;
        m.start_time = Some(start);
        let id = m.id;
        t.matches.push(m);
        id
    }

    #[test]
    fn single_silent_player_is_reported_for_disqualification() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a", true);
        let p2 = add_participant(&mut t, "b", false);
        let mid = add_ongoing_match(&mut t, p1, p2, ts(10_000));

        let report = t.timeout_pass(ts(11_000));

        assert_eq!(report.to_disqualify, vec![(mid, p2)]);
        assert!(report.both_silent_dropped.is_empty());
        assert!(t.find_match(mid).unwrap().checked_dq);
        // not dropped by this pass alone; caller still owns the upload.
        assert_eq!(t.find_match(mid).unwrap().phase, MatchPhase::Ongoing);
    }

    #[test]
    fn both_silent_players_drop_the_match_outright() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a", false);
        let p2 = add_participant(&mut t, "b", false);
        let mid = add_ongoing_match(&mut t, p1, p2, ts(10_000));

        let report = t.timeout_pass(ts(11_000));

        assert!(report.to_disqualify.is_empty());
        assert_eq!(report.both_silent_dropped, vec![mid]);
        assert_eq!(t.find_match(mid).unwrap().phase, MatchPhase::Done);
    }

    #[test]
    fn active_match_under_no_silence_is_left_alone() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a", true);
        let p2 = add_participant(&mut t, "b", true);
        let mid = add_ongoing_match(&mut t, p1, p2, ts(10_000));

        let report = t.timeout_pass(ts(11_000));

        assert!(report.to_disqualify.is_empty());
        assert!(report.both_silent_dropped.is_empty());
        assert!(t.find_match(mid).unwrap().checked_dq);
    }

    #[test]
    fn resume_preemption_marks_overdue_matches_without_disqualifying() {
        let mut t = sample_tournament();
        let p1 = add_participant(&mut t, "a", false);
        let p2 = add_participant(&mut t, "b", false);
        let mid = add_ongoing_match(&mut t, p1, p2, ts(10_000));

        let forced = t.preempt_afk_on_resume(ts(11_000));

        assert_eq!(forced, 1);
        assert!(t.find_match(mid).unwrap().checked_dq);
        assert_eq!(t.find_match(mid).unwrap().phase, MatchPhase::Ongoing);
    }
}
