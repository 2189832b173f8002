//! the aggregate root: one per guild/instance (spec.md §3, §4.2).
//!
//! Ownership follows the design note on cyclic back-references: `Tournament`
//! owns `participants`/`matches`/`streamers` by value; everything that would
//! otherwise be a pointer is a `Uuid`-keyed lookup resolved through the
//! `find_*` helpers below, grounded on `app_core`'s `ObjectIdVersion`
//! id-keyed-lookup convention rather than `Rc`/`RefCell` graphs.

pub mod lifecycle;
pub mod matches;
pub mod passes;
pub mod persistence;
pub mod queue;
pub mod reconcile;
pub mod registration;
pub mod scheduler;
pub mod seeding;

use crate::config::TournamentConfig;
use crate::identifiers::{CategoryHandle, MatchId, ParticipantId, RemoteId, StreamerId};
use crate::match_::Match;
use crate::participant::Participant;
use crate::phase::{EventName, SubPhase, TournamentPhase};
use crate::streamer::Streamer;
use crate::timing::{CheckinReminder, CheckinTiming, RegisterTiming, TzInstant};
use crate::top8::Top8;
use std::collections::HashSet;

/// aggregate root holding every piece of one tournament's state.
pub struct Tournament {
    pub remote_id: RemoteId,
    pub name: String,
    pub game: String,
    pub url: String,
    pub limit: Option<u32>,
    pub tournament_start: TzInstant,
    pub config: TournamentConfig,
    /// name of the settings snapshot this tournament was configured from
    /// (spec.md §6 persisted layout `config_name`); the settings themselves
    /// are owned by the embedding application's configuration store.
    pub config_name: String,

    pub phase: TournamentPhase,
    pub register_phase: SubPhase,
    pub checkin_phase: SubPhase,
    pub ignored_events: HashSet<EventName>,

    pub register: RegisterTiming,
    pub checkin: CheckinTiming,
    pub checkin_reminders: Vec<CheckinReminder>,

    pub participants: Vec<Participant>,
    pub matches: Vec<Match>,
    pub streamers: Vec<Streamer>,
    pub winner_categories: Vec<CategoryHandle>,
    pub loser_categories: Vec<CategoryHandle>,

    pub top_8: Top8,

    pub task_errors: u32,
    pub register_message_id: Option<String>,
    /// last time the ranking source was successfully fetched, enforcing the
    /// 5-minute cooldown (spec.md §4.5).
    pub last_ranking_fetch: Option<TzInstant>,
}

pub const MAX_TASK_ERRORS: u32 = 5;
pub const MATCH_LAUNCH_BATCH: usize = 20;
pub const CATEGORY_CAPACITY: usize = 50;
pub const CHANNEL_DELETION_DELAY_SECS: u64 = 300;

impl Tournament {
    pub fn find_participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn find_participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn find_participant_by_player_id(&self, player_id: &RemoteId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.player_id.as_ref() == Some(player_id))
    }

    pub fn find_participant_by_user_id(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user.id == user_id)
    }

    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn find_match_by_remote_id(&self, remote_id: &RemoteId) -> Option<&Match> {
        self.matches.iter().find(|m| &m.remote_id == remote_id)
    }

    pub fn find_match_by_set(&self, set: u64) -> Option<&Match> {
        self.matches.iter().find(|m| m.set == set)
    }

    pub fn find_streamer(&self, id: StreamerId) -> Option<&Streamer> {
        self.streamers.iter().find(|s| s.id == id)
    }

    pub fn find_streamer_mut(&mut self, id: StreamerId) -> Option<&mut Streamer> {
        self.streamers.iter_mut().find(|s| s.id == id)
    }

    pub fn find_streamer_by_set(&self, set: u64) -> Option<&Streamer> {
        self.streamers.iter().find(|s| {
            s.matches.iter().any(|entry| match entry {
                crate::streamer::StreamerEntry::Placeholder(n) => *n == set,
                crate::streamer::StreamerEntry::Match(id) => {
                    self.find_match(*id).map(|m| m.set) == Some(set)
                }
            })
        })
    }
}
