//! Periodic eviction of finished builds.
//!
//! The registry never releases memory on its own; `SweepTask` is the
//! maintenance loop that calls [`BuildRegistry::sweep`] on a fixed interval
//! until its `CancellationToken` is cancelled.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use buildstate_types::config::SweepConfig;

use crate::registry::BuildRegistry;

/// Background loop that bounds registry memory.
#[derive(Debug, Clone)]
pub struct SweepTask {
    registry: BuildRegistry,
    max_age: Duration,
    interval: Duration,
}

impl SweepTask {
    pub fn new(registry: BuildRegistry, max_age: Duration, interval: Duration) -> Self {
        Self {
            registry,
            max_age,
            interval,
        }
    }

    pub fn from_config(registry: BuildRegistry, config: &SweepConfig) -> Self {
        Self::new(registry, config.max_age(), config.interval())
    }

    /// Run a single sweep pass, returning the number of builds evicted.
    pub fn run_once(&self) -> usize {
        self.registry.sweep(self.max_age)
    }

    /// Sweep every `interval` until `cancel` fires.
    ///
    /// The first pass happens one full interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        tracing::debug!(
            max_age_secs = self.max_age.as_secs(),
            interval_secs = self.interval.as_secs(),
            "sweep task started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("sweep task stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once();
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) onto the current tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildstate_types::build::{BuildKind, BuildUpdate, NewBuild};

    fn seed(registry: &BuildRegistry) {
        registry.create(NewBuild::new("done", BuildKind::Quiz, "s1", "p1", "Done"));
        registry.create(NewBuild::new("live", BuildKind::MindMap, "s1", "p1", "Live"));
        registry.complete("done", None);
        registry.update("live", BuildUpdate::progress(10));
    }

    #[test]
    fn test_from_config_uses_configured_durations() {
        let config = SweepConfig {
            max_age_secs: 120,
            interval_secs: 15,
            enabled: true,
        };
        let task = SweepTask::from_config(BuildRegistry::new(), &config);
        assert_eq!(task.max_age, Duration::from_secs(120));
        assert_eq!(task.interval, Duration::from_secs(15));
    }

    #[test]
    fn test_run_once_keeps_recent_builds() {
        let registry = BuildRegistry::new();
        seed(&registry);
        let task = SweepTask::new(registry.clone(), Duration::from_secs(3600), Duration::from_secs(60));
        assert_eq!(task.run_once(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_task_sweeps_finished_builds() {
        let registry = BuildRegistry::new();
        seed(&registry);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let cancel = CancellationToken::new();
        let handle = SweepTask::new(registry.clone(), Duration::ZERO, Duration::from_millis(10))
            .spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(registry.get("done").is_none());
        assert!(registry.get("live").is_some());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_task_exits_without_sweeping() {
        let registry = BuildRegistry::new();
        seed(&registry);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let handle = SweepTask::new(registry.clone(), Duration::ZERO, Duration::from_secs(3600))
            .spawn(cancel);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep task did not stop")
            .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
