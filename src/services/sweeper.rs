//! Deadline sweeper
//!
//! Periodically closes active attempts whose deadline has passed, so an
//! attempt abandoned by its owner still ends up `auto_submitted` with a score.

use std::time::Duration;

use anyhow::Result;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{services::AttemptService, state::AppState, utils::now_utc};

/// Background task closing expired attempts
pub struct DeadlineSweeper {
    state: AppState,
    interval: Duration,
}

impl DeadlineSweeper {
    /// Create a sweeper using the configured interval
    pub fn new(state: AppState) -> Self {
        let interval = Duration::from_secs(state.config().sweeper.interval_secs);
        Self { state, interval }
    }

    /// Spawn the sweep loop; it exits once `shutdown` flips to `true`
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Deadline sweeper started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        tracing::error!(error = %e, "Deadline sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Deadline sweeper stopped");
    }

    /// Run a single sweep against the current server time
    pub async fn sweep_once(&self) -> Result<()> {
        let stats = AttemptService::finalize_expired(&self.state, now_utc()).await?;

        if stats.examined > 0 {
            tracing::info!(
                examined = stats.examined,
                finalized = stats.finalized,
                already_finalized = stats.already_finalized,
                failed = stats.failed,
                "Deadline sweep completed"
            );
        } else {
            tracing::debug!("Deadline sweep found no expired attempts");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::{
        models::AttemptStatus,
        test_utils::{active_attempt, harness_with_config, test_config, test_definition},
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn test_sweep_once_closes_expired_attempt() {
        let h = harness_with_config(test_config());
        let test = test_definition(Some(30), &[Some(100)]);
        h.catalog.add(test.clone()).await;
        let attempt = active_attempt(Uuid::new_v4(), &test, now_utc() - ChronoDuration::hours(2));
        h.attempts.put(attempt.clone()).await;

        tokio_test::assert_ok!(DeadlineSweeper::new(h.state.clone()).sweep_once().await);

        let stored = h.attempts.get(attempt.id).await.unwrap();
        assert_eq!(stored.status, AttemptStatus::AutoSubmitted);
        assert_eq!((stored.score, stored.max_score), (0, 100));
    }

    #[tokio::test]
    async fn test_spawned_sweeper_stops_on_shutdown() {
        let mut config = test_config();
        config.sweeper.interval_secs = 1;
        let h = harness_with_config(config);
        let test = test_definition(Some(30), &[Some(100)]);
        h.catalog.add(test.clone()).await;
        let attempt = active_attempt(Uuid::new_v4(), &test, now_utc() - ChronoDuration::hours(1));
        h.attempts.put(attempt.clone()).await;

        let (tx, rx) = watch::channel(false);
        let handle = DeadlineSweeper::new(h.state.clone()).spawn(rx);

        // the first tick fires immediately
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();

        assert!(!h.attempts.get(attempt.id).await.unwrap().is_active());
    }
}
