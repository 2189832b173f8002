//! per-streamer ordered queue of matches (spec.md §3, §4.4).

use crate::identifiers::{MatchId, StreamerId, UserRef};
use crate::match_::{Match, MatchPhase};
use serde::{Deserialize, Serialize};

/// an entry in a streamer's queue: either a materialized match, or an
/// integer set placeholder referring to a future match not yet locally
/// created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamerEntry {
    Match(MatchId),
    Placeholder(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streamer {
    pub id: StreamerId,
    pub owner: UserRef,
    pub channel_handle: String,
    pub room_id: Option<String>,
    pub room_code: Option<String>,
    pub matches: Vec<StreamerEntry>,
}

impl Streamer {
    pub fn new(owner: UserRef, channel_handle: impl Into<String>) -> Self {
        Self {
            id: StreamerId::new(),
            owner,
            channel_handle: channel_handle.into(),
            room_id: None,
            room_code: None,
            matches: Vec::new(),
        }
    }

    /// the head of `matches` that is materialized and not `Done`, given a
    /// lookup for resolving queue entries to live matches.
    pub fn current_match<'a>(&self, lookup: impl Fn(MatchId) -> Option<&'a Match>) -> Option<&'a Match> {
        for entry in &self.matches {
            if let StreamerEntry::Match(id) = entry {
                if let Some(m) = lookup(*id) {
                    if m.phase != MatchPhase::Done {
                        return Some(m);
                    }
                }
            }
        }
        None
    }

    pub fn set_number(&self, entry: StreamerEntry, lookup: impl Fn(MatchId) -> Option<u64>) -> Option<u64> {
        match entry {
            StreamerEntry::Placeholder(set) => Some(set),
            StreamerEntry::Match(id) => lookup(id),
        }
    }
}
