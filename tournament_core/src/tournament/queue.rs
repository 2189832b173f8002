//! streamer queue maintenance (spec.md §4.4).
//!
//! Queue entries are kept as [`crate::streamer::StreamerEntry`] so a
//! streamer can be queued up for a set that hasn't produced a [`Match`] yet;
//! `check_integrity` is what reconciles placeholders against materialized
//! matches once they appear.

use super::Tournament;
use crate::errors::{EngineError, EngineResult};
use crate::identifiers::{MatchId, StreamerId};
use crate::match_::MatchPhase;
use crate::streamer::StreamerEntry;
use crate::timing::TzInstant;

impl Tournament {
    /// replaces any placeholder entry whose set now has a materialized
    /// match, and drops entries for matches already `Done`. Called once per
    /// reconciliation pass.
    pub fn check_streamers_integrity(&mut self) {
        let resolved: Vec<(u64, crate::identifiers::MatchId)> = self
            .matches
            .iter()
            .map(|m| (m.set, m.id))
            .collect();

        for s in &mut self.streamers {
            for entry in &mut s.matches {
                if let StreamerEntry::Placeholder(set) = entry {
                    if let Some((_, id)) = resolved.iter().find(|(set2, _)| set2 == set) {
                        *entry = StreamerEntry::Match(*id);
                    }
                }
            }
            s.matches.retain(|entry| match entry {
                StreamerEntry::Match(id) => self
                    .matches
                    .iter()
                    .find(|m| m.id == *id)
                    .map(|m| m.phase != MatchPhase::Done)
                    .unwrap_or(false),
                StreamerEntry::Placeholder(_) => true,
            });
        }
    }

    pub fn streamer_queue_add(&mut self, streamer: StreamerId, entry: StreamerEntry) -> EngineResult<()> {
        let s = self
            .find_streamer_mut(streamer)
            .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
        s.matches.push(entry);
        Ok(())
    }

    /// validates a batch of requested set numbers before they join
    /// `streamer`'s queue (spec.md §4.4 `checkIntegrity`): rejects a set
    /// already queued (by this streamer), a set claimed by another
    /// streamer, or a set whose match is already `Done`. When `add` is
    /// true, appends the sets (as placeholders if no match exists for them
    /// yet) and parks any already-`ONGOING` match among them `ON_HOLD`
    /// unless it's the new queue head.
    pub fn check_integrity(&mut self, streamer: StreamerId, sets: &[u64], add: bool) -> EngineResult<()> {
        let queued: Vec<u64> = {
            let s = self
                .find_streamer(streamer)
                .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
            s.matches
                .iter()
                .filter_map(|entry| s.set_number(*entry, |id| self.find_match(id).map(|m| m.set)))
                .collect()
        };
        for &set in sets {
            if queued.contains(&set) {
                return Err(EngineError::Invariant(format!("set {set} already queued")));
            }
            if let Some(m) = self.find_match_by_set(set) {
                if m.phase == MatchPhase::Done {
                    return Err(EngineError::Invariant(format!("set {set} is already completed")));
                }
                if let Some(owner) = m.streamer {
                    if owner != streamer {
                        return Err(EngineError::Invariant(format!(
                            "set {set} is claimed by another streamer"
                        )));
                    }
                }
            }
        }

        if !add {
            return Ok(());
        }

        for &set in sets {
            let match_id = self.find_match_by_set(set).map(|m| m.id);
            let entry = match match_id {
                Some(id) => StreamerEntry::Match(id),
                None => StreamerEntry::Placeholder(set),
            };
            if let Some(s) = self.find_streamer_mut(streamer) {
                s.matches.push(entry);
            }
            if let Some(id) = match_id {
                if let Some(m) = self.find_match_mut(id) {
                    m.streamer = Some(streamer);
                }
            }
        }

        let head_set = self
            .find_streamer(streamer)
            .and_then(|s| s.current_match(|id| self.find_match(id)))
            .map(|m| m.set);
        for &set in sets {
            if Some(set) == head_set {
                continue;
            }
            if let Some(id) = self.find_match_by_set(set).map(|m| m.id) {
                if self.find_match(id).map(|m| m.phase) == Some(MatchPhase::Ongoing) {
                    let _ = self.stream_queue_add_pause(id);
                }
            }
        }

        Ok(())
    }

    /// removes `entry` from `streamer`'s queue; if it was a materialized
    /// match, cancels its stream (spec.md §4.4 `remove`: "for materialised
    /// matches, calls cancelStream()"), re-enabling AFK checks and clearing
    /// the match's streamer back-reference.
    pub fn streamer_queue_remove(
        &mut self,
        streamer: StreamerId,
        entry: StreamerEntry,
        now: TzInstant,
    ) -> EngineResult<()> {
        {
            let s = self
                .find_streamer_mut(streamer)
                .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
            s.matches.retain(|e| e != &entry);
        }
        if let StreamerEntry::Match(id) = entry {
            let _ = self.cancel_stream(id, now);
        }
        Ok(())
    }

    /// swaps the position of two entries in a streamer's queue.
    pub fn streamer_queue_swap(&mut self, streamer: StreamerId, a: usize, b: usize) -> EngineResult<()> {
        let s = self
            .find_streamer_mut(streamer)
            .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
        if a >= s.matches.len() || b >= s.matches.len() {
            return Err(EngineError::Invariant("queue index out of range".to_string()));
        }
        s.matches.swap(a, b);
        Ok(())
    }

    pub fn streamer_queue_insert(
        &mut self,
        streamer: StreamerId,
        index: usize,
        entry: StreamerEntry,
    ) -> EngineResult<()> {
        let s = self
            .find_streamer_mut(streamer)
            .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
        let index = index.min(s.matches.len());
        s.matches.insert(index, entry);
        Ok(())
    }

    /// removes a streamer entirely, bulk-cancelling the stream of every
    /// materialized match in its queue (spec.md §4.4 `end`: "bulk cancel of
    /// all materialised matches' streams").
    pub fn end_streamer(&mut self, streamer: StreamerId, now: TzInstant) -> EngineResult<()> {
        let idx = self
            .streamers
            .iter()
            .position(|s| s.id == streamer)
            .ok_or_else(|| EngineError::Invariant("unknown streamer".to_string()))?;
        let materialized: Vec<MatchId> = self.streamers[idx]
            .matches
            .iter()
            .filter_map(|e| match e {
                StreamerEntry::Match(id) => Some(*id),
                StreamerEntry::Placeholder(_) => None,
            })
            .collect();
        self.streamers.remove(idx);
        for id in materialized {
            let _ = self.cancel_stream(id, now);
        }
        for m in &mut self.matches {
            if m.streamer == Some(streamer) {
                m.streamer = None;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TournamentConfig;
    use crate::identifiers::{RemoteId, UserRef};
    use crate::match_::Match;
    use crate::participant::Participant;
    use crate::streamer::Streamer;
    use crate::timing::TzInstant;
    use crate::top8::Top8;

    fn ts(epoch: i64) -> TzInstant {
        TzInstant::new(epoch, 0)
    }

    fn sample_tournament() -> Tournament {
        Tournament::setup(
            RemoteId::new("t1"),
            "Test".into(),
            "Game".into(),
            "http://example.test".into(),
            None,
            ts(10_000),
            TournamentConfig::default(),
            "default".into(),
        )
        .unwrap()
    }

    fn add_streamer(t: &mut Tournament) -> StreamerId {
        let s = Streamer::new(UserRef { id: "s1".into(), display_name: "Caster".into() }, "chan");
        let id = s.id;
        t.streamers.push(s);
        id
    }

    fn add_match(t: &mut Tournament, set: u64) -> crate::identifiers::MatchId {
        let p1 = Participant::new(UserRef { id: "a".into(), display_name: "A".into() });
        let p2 = Participant::new(UserRef { id: "b".into(), display_name: "B".into() });
        let (p1_id, p2_id) = (p1.id, p2.id);
        t.participants.push(p1);
        t.participants.push(p2);
        let m = Match::new(RemoteId::new(format!("m{set}")), 1, set, p1_id, p2_id, &Top8::default());
        let id = m.id;
        t.matches.push(m);
        id
    }

    #[test]
    fn check_integrity_rejects_a_set_already_in_the_queue() {
        let mut t = sample_tournament();
        let s = add_streamer(&mut t);
        t.check_integrity(s, &[1], true).unwrap();
        assert!(t.check_integrity(s, &[1], true).is_err());
    }

    #[test]
    fn check_integrity_rejects_a_set_claimed_by_another_streamer() {
        let mut t = sample_tournament();
        let s1 = add_streamer(&mut t);
        let s2 = add_streamer(&mut t);
        add_match(&mut t, 1);
        t.check_integrity(s1, &[1], true).unwrap();
        assert!(t.check_integrity(s2, &[1], true).is_err());
    }

    #[test]
    fn check_integrity_rejects_a_completed_match() {
        let mut t = sample_tournament();
        let s = add_streamer(&mut t);
        let mid = add_match(&mut t, 1);
        t.find_match_mut(mid).unwrap().phase = MatchPhase::Done;
        assert!(t.check_integrity(s, &[1], true).is_err());
    }

    #[test]
    fn check_integrity_with_add_false_only_validates() {
        let mut t = sample_tournament();
        let s = add_streamer(&mut t);
        t.check_integrity(s, &[1], false).unwrap();
        assert!(t.find_streamer(s).unwrap().matches.is_empty());
    }

    #[test]
    fn check_integrity_parks_an_ongoing_non_head_match_on_hold() {
        let mut t = sample_tournament();
        let s = add_streamer(&mut t);
        let head = add_match(&mut t, 1);
        t.check_integrity(s, &[1], true).unwrap();

        let second = add_match(&mut t, 2);
        t.find_match_mut(second).unwrap().phase = MatchPhase::Ongoing;
        t.find_match_mut(second).unwrap().start_time = Some(ts(10_000));
        t.check_integrity(s, &[2], true).unwrap();

        assert_eq!(t.find_match(head).unwrap().streamer, Some(s));
        assert_eq!(t.find_match(second).unwrap().phase, MatchPhase::OnHold);
    }
}
