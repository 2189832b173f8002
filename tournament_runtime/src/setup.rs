//! runtime entry point for provisioning a tournament handle: fetches remote
//! state and either returns a fresh draft handle, or — if the bracket is
//! already underway — resumes it and immediately starts its [`LoopTask`]
//! (spec.md §4.2 `setup`, "AlreadyStarted").
//!
//! [`LoopTask`]: crate::loop_task

use crate::handle::TournamentHandle;
use crate::registry::LoopTaskRegistry;
use std::sync::Arc;
use std::time::Duration;
use tournament_core::identifiers::RemoteId;
use tournament_core::ports::config_store::ConfigStorePort;
use tournament_core::ports::notifier::NotifierPort;
use tournament_core::ports::provider::ProviderPort;
use tournament_core::ports::ranking::RankingPort;
use tournament_core::{EngineResult, SetupOutcome, Tournament, TournamentConfig};
use uuid::Uuid;

/// a provisioned handle paired with whichever [`SetupOutcome`] the engine
/// returned, so the caller can tell a fresh draft from a bracket that
/// resumed straight into `Ongoing`.
pub enum ProvisionOutcome {
    Draft(TournamentHandle),
    Resumed {
        handle: TournamentHandle,
        /// remote participants that couldn't be matched to a chat user.
        unmatched: Vec<RemoteId>,
    },
}

#[allow(clippy::too_many_arguments)]
pub async fn setup_or_resume(
    remote_id: RemoteId,
    provider: Arc<dyn ProviderPort>,
    notifier: Arc<dyn NotifierPort>,
    ranking: Arc<dyn RankingPort>,
    config_store: Arc<dyn ConfigStorePort>,
    config: TournamentConfig,
    config_name: String,
    config_key: Uuid,
    registry: &LoopTaskRegistry,
    tick_interval: Duration,
) -> EngineResult<ProvisionOutcome> {
    let outcome = Tournament::setup_or_resume(remote_id, provider.as_ref(), notifier.as_ref(), config, config_name).await?;

    Ok(match outcome {
        SetupOutcome::Draft(tournament) => {
            let handle = TournamentHandle::new(tournament, provider, notifier, ranking, config_store, config_key);
            ProvisionOutcome::Draft(handle)
        }
        SetupOutcome::Resumed { tournament, unmatched } => {
            let handle = TournamentHandle::new(tournament, provider, notifier, ranking, config_store, config_key);
            // the bracket is already running: start the tick driver right
            // away rather than waiting for a separate `start()` call.
            crate::loop_task::spawn(handle.clone(), registry.clone(), tick_interval);
            ProvisionOutcome::Resumed { handle, unmatched }
        }
    })
}
