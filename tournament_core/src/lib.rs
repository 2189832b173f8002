//! Domain types and ports for the tournament orchestration engine
//! (spec.md, all sections).
//!
//! This crate owns no I/O. It defines the aggregate root ([`Tournament`])
//! and its entities ([`Participant`], [`Match`], [`Streamer`]), the ports
//! the engine is parameterized over (see [`ports`]), and the business logic
//! operating on them (`tournament::*` submodules: lifecycle transitions,
//! the event scheduler, reconciliation, per-tick passes, the streamer
//! queue, seeding, and persisted-state round-tripping).
//!
//! Concrete adapters live in sibling crates: `tournament_provider_challonge`
//! implements [`ports::ProviderPort`] over HTTP, `tournament_runtime` drives
//! the periodic tick, and `tournament_testkit` provides in-memory fakes of
//! every port for tests.

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod match_;
pub mod participant;
pub mod phase;
pub mod ports;
pub mod snapshot;
pub mod streamer;
pub mod timing;
pub mod top8;
pub mod tournament;

pub use config::TournamentConfig;
pub use errors::{EngineError, EngineResult, ProviderError};
pub use identifiers::{
    CategoryHandle, ChannelHandle, MatchId, ParticipantId, RemoteId, StreamerId, UserRef,
};
pub use match_::{Match, MatchPhase, Warned};
pub use participant::Participant;
pub use phase::{EventName, SubPhase, TournamentPhase};
pub use streamer::{Streamer, StreamerEntry};
pub use timing::{CheckinReminder, CheckinTiming, RegisterTiming, TzInstant};
pub use top8::Top8;
pub use tournament::lifecycle::SetupOutcome;
pub use tournament::Tournament;
