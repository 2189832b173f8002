//! anti-duplicate-by-name registry of running loop tasks (spec.md §5:
//! "`LoopTask` is identified by a name derived from tournament id. On task
//! start, any pre-existing task with the same name is cancelled first.").
//!
//! Grounded on `cr_single_instance::registry`'s `DashMap`-keyed, lazily
//! populated bus registry, generalized here from broadcast senders to
//! abortable task handles.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// process-wide table of running tournament loop tasks, keyed by the name
/// the caller derives from the tournament id.
#[derive(Clone, Default)]
pub struct LoopTaskRegistry {
    tasks: Arc<DashMap<String, JoinHandle<()>>>,
}

impl LoopTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// registers `handle` under `name`, aborting and replacing whatever was
    /// already registered there.
    pub fn insert(&self, name: impl Into<String>, handle: JoinHandle<()>) {
        let name = name.into();
        if let Some((_, old)) = self.tasks.remove(&name) {
            old.abort();
        }
        self.tasks.insert(name, handle);
    }

    /// cooperative stop: aborts the task and removes it from the registry.
    /// Returns whether a task was actually found under `name`.
    pub fn stop(&self, name: &str) -> bool {
        match self.tasks.remove(name) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.tasks.get(name).map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// aborts and drops every registered task (module-unload / shutdown path).
    pub fn stop_all(&self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn starting_a_task_under_the_same_name_cancels_the_old_one() {
        let registry = LoopTaskRegistry::new();
        let ran_to_completion = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let flag = ran_to_completion.clone();
        let first = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        registry.insert("tournament-1", first);
        assert!(registry.is_running("tournament-1"));

        let second = tokio::spawn(async {});
        registry.insert("tournament-1", second);

        tokio::task::yield_now().await;
        assert!(!ran_to_completion.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn stop_reports_whether_a_task_was_registered() {
        let registry = LoopTaskRegistry::new();
        assert!(!registry.stop("missing"));
    }
}
