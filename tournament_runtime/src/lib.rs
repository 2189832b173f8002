//! single-instance process runtime driving one or more [`Tournament`]s
//! through their periodic [`LoopTask`] tick (spec.md §5).
//!
//! Grounded on `cr_single_instance`, the teacher's own in-process,
//! non-distributed runtime: a `DashMap`-keyed registry of named background
//! tasks, generalized here from broadcast buses to abortable tick drivers.
//!
//! [`Tournament`]: tournament_core::Tournament
//! [`LoopTask`]: loop_task

pub mod handle;
pub mod loop_task;
pub mod registry;
pub mod seed;
pub mod setup;
pub mod tick;

pub use handle::TournamentHandle;
pub use loop_task::{end_tournament, DEFAULT_TICK_INTERVAL};
pub use registry::LoopTaskRegistry;
pub use seed::{seed_and_upload, start_tournament};
pub use setup::{setup_or_resume, ProvisionOutcome};
pub use tick::run_tick;
