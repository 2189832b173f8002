//! bundles one tournament's state with the ports it is driven through
//! (spec.md §3 "concurrency: `lock`", §5).

use std::sync::Arc;
use tokio::sync::Mutex;
use tournament_core::ports::config_store::ConfigStorePort;
use tournament_core::ports::notifier::NotifierPort;
use tournament_core::ports::provider::ProviderPort;
use tournament_core::ports::ranking::RankingPort;
use tournament_core::Tournament;
use uuid::Uuid;

/// the exclusive `lock` named in spec.md §3, plus the concrete adapters a
/// single tournament is wired to. One `TournamentHandle` exists per
/// guild/instance; the loop task and every user-facing operation go through
/// the same `Arc<Mutex<Tournament>>` so they can never interleave.
#[derive(Clone)]
pub struct TournamentHandle {
    pub tournament: Arc<Mutex<Tournament>>,
    pub provider: Arc<dyn ProviderPort>,
    pub notifier: Arc<dyn NotifierPort>,
    pub ranking: Arc<dyn RankingPort>,
    pub config_store: Arc<dyn ConfigStorePort>,
    /// the `ConfigStorePort` lookup key for this tournament's settings and
    /// persisted snapshot.
    pub config_key: Uuid,
}

impl TournamentHandle {
    pub fn new(
        tournament: Tournament,
        provider: Arc<dyn ProviderPort>,
        notifier: Arc<dyn NotifierPort>,
        ranking: Arc<dyn RankingPort>,
        config_store: Arc<dyn ConfigStorePort>,
        config_key: Uuid,
    ) -> Self {
        Self {
            tournament: Arc::new(Mutex::new(tournament)),
            provider,
            notifier,
            ranking,
            config_store,
            config_key,
        }
    }

    /// the name the loop task is registered under (spec.md §5: "a name
    /// derived from tournament id").
    pub fn loop_task_name(&self) -> String {
        format!("tournament-loop-{}", self.config_key)
    }
}
