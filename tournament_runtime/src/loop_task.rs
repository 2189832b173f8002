//! spawns and drives the periodic `LoopTask` (spec.md §5: "single-threaded
//! cooperative ... runs every 15 seconds ... hard timeout of 30 seconds").
//!
//! Grounded on `cr_single_instance`'s process-wide task spawning, adapted
//! from a broadcast fan-out loop to a fixed-interval tick driver.

use crate::handle::TournamentHandle;
use crate::registry::LoopTaskRegistry;
use serde_json::{json, Value};
use std::time::Duration;
use tournament_core::identifiers::ChannelHandle;
use tournament_core::ports::notifier::ToKind;
use tournament_core::TzInstant;

/// the recommended production tick period (spec.md §5).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(15);
const TICK_TIMEOUT: Duration = Duration::from_secs(30);

/// starts (or restarts) the loop task for `handle`, registering it under
/// `handle.loop_task_name()` so a pre-existing task for the same
/// tournament is cancelled first (spec.md §5 "Cancellation").
pub fn spawn(handle: TournamentHandle, registry: LoopTaskRegistry, tick_interval: Duration) {
    let name = handle.loop_task_name();
    let join = tokio::spawn(run_loop(handle, tick_interval));
    registry.insert(name, join);
}

/// cooperative stop (spec.md §5 `stopLoopTask()`): a cancelled tick is
/// never retried.
pub fn stop(registry: &LoopTaskRegistry, handle: &TournamentHandle) -> bool {
    registry.stop(&handle.loop_task_name())
}

/// finalizes the remote bracket, deletes every winner/loser category
/// channel, stops the loop task, and transitions `ONGOING -> DONE`
/// (spec.md §4.2 `end()`).
pub async fn end_tournament(handle: &TournamentHandle, registry: &LoopTaskRegistry) -> anyhow::Result<()> {
    handle.provider.finalize_tournament().await?;

    let categories = {
        let mut t = handle.tournament.lock().await;
        t.end()?;
        t.winner_categories
            .iter()
            .chain(t.loser_categories.iter())
            .cloned()
            .collect::<Vec<_>>()
    };
    for category in categories {
        let _ = handle.notifier.delete_channel(&ChannelHandle(category.0)).await;
    }

    registry.stop(&handle.loop_task_name());
    Ok(())
}

async fn run_loop(handle: TournamentHandle, tick_interval: Duration) {
    let forced = {
        let mut t = handle.tournament.lock().await;
        let now = TzInstant::from_utc_now(t.tournament_start.tz_offset_seconds());
        t.preempt_afk_on_resume(now)
    };
    if forced > 0 {
        handle
            .notifier
            .notify_to(ToKind::ResumeTimeoutsCancelled, json!({ "count": forced }))
            .await;
    }

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let outcome = tokio::time::timeout(TICK_TIMEOUT, crate::tick::run_tick(&handle)).await;
        let budget_exceeded = match outcome {
            Ok(Ok(())) => {
                let mut t = handle.tournament.lock().await;
                t.reset_task_errors();
                false
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "tournament loop tick failed");
                let mut t = handle.tournament.lock().await;
                t.record_task_error()
            }
            Err(_) => {
                tracing::warn!(timeout = ?TICK_TIMEOUT, "tournament loop tick timed out");
                let mut t = handle.tournament.lock().await;
                t.record_task_error()
            }
        };

        if budget_exceeded {
            handle
                .notifier
                .notify_to(ToKind::TaskErrorBudgetExceeded, Value::Null)
                .await;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::TournamentHandle;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tournament_core::config::TournamentConfig;
    use tournament_core::identifiers::RemoteId;
    use tournament_core::ports::config_store::{ConfigStoreError, ConfigStorePort, ConfigStoreResult};
    use tournament_core::ports::notifier::NotifierPort;
    use tournament_core::ports::provider::ProviderPort;
    use tournament_core::ports::ranking::RankingPort;
    use tournament_core::snapshot::TournamentSnapshot;
    use tournament_core::{Tournament, TournamentPhase};
    use tournament_testkit::{MockNotifier, MockProvider, MockRanking};
    use uuid::Uuid;

    /// always fails `save_snapshot`, so a driven loop burns through the
    /// error budget deterministically instead of depending on real I/O.
    #[derive(Default)]
    struct FailingConfigStore;

    #[async_trait]
    impl ConfigStorePort for FailingConfigStore {
        async fn load_settings(&self, _id: Uuid) -> ConfigStoreResult<TournamentConfig> {
            Err(ConfigStoreError::NotFound)
        }
        async fn save_settings(&self, _id: Uuid, _config: &TournamentConfig) -> ConfigStoreResult<()> {
            Ok(())
        }
        async fn load_snapshot(&self, _id: Uuid) -> ConfigStoreResult<Option<TournamentSnapshot>> {
            Ok(None)
        }
        async fn save_snapshot(&self, _id: Uuid, _snapshot: &TournamentSnapshot) -> ConfigStoreResult<()> {
            Err(ConfigStoreError::Other("boom".to_string()))
        }
    }

    fn ts(epoch: i64) -> tournament_core::TzInstant {
        tournament_core::TzInstant::new(epoch, 0)
    }

    fn ongoing_tournament() -> Tournament {
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
        t.phase = TournamentPhase::Ongoing;
        t
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn error_budget_exceeded_cancels_the_loop_task() {
        let provider: Arc<dyn ProviderPort> = Arc::new(MockProvider::new());
        let notifier = Arc::new(MockNotifier::new());
        let ranking: Arc<dyn RankingPort> = Arc::new(MockRanking::new());
        let config_store: Arc<dyn ConfigStorePort> = Arc::new(FailingConfigStore::default());

        let handle = TournamentHandle::new(
            ongoing_tournament(),
            provider,
            notifier.clone() as Arc<dyn NotifierPort>,
            ranking,
            config_store,
            Uuid::new_v4(),
        );
        let registry = LoopTaskRegistry::new();
        let name = handle.loop_task_name();

        spawn(handle.clone(), registry.clone(), Duration::from_millis(50));
        assert!(registry.is_running(&name));

        for _ in 0..8 {
            tokio::time::advance(Duration::from_millis(50)).await;
            tokio::task::yield_now().await;
        }

        assert!(!registry.is_running(&name));
        let to_notifications = notifier.to_notifications.lock().unwrap();
        assert!(to_notifications
            .iter()
            .any(|(kind, _)| *kind == ToKind::TaskErrorBudgetExceeded));
    }

    #[test]
    fn stop_is_a_no_op_when_nothing_is_registered() {
        let registry = LoopTaskRegistry::new();
        let handle_name_only = "tournament-loop-nonexistent";
        assert!(!registry.stop(handle_name_only));
    }
}
