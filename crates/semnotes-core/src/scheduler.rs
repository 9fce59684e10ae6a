//! Periodic score recomputation.
//!
//! The scheduler owns no global state: it drives a [`RecomputeTrigger`] once
//! after a startup delay and then on a fixed interval, until its shutdown
//! future resolves. Event-driven callers use the same trigger directly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior};

use crate::scoring::RecomputeSummary;
use crate::traits::RecomputeTrigger;

/// Timing for the score scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time between recomputation passes.
    pub interval: Duration,
    /// Delay before the first pass after start.
    pub startup_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            startup_delay: Duration::from_secs(5),
        }
    }
}

/// Runs score recomputation on a timer.
pub struct ScoreScheduler {
    trigger: Arc<dyn RecomputeTrigger>,
    config: SchedulerConfig,
}

impl ScoreScheduler {
    pub fn new(trigger: Arc<dyn RecomputeTrigger>, config: SchedulerConfig) -> Self {
        Self { trigger, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one pass. Failures are logged and swallowed.
    pub async fn tick(&self) -> Option<RecomputeSummary> {
        match self.trigger.recompute_now().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!("leaderboard update failed: {e:#}");
                None
            }
        }
    }

    /// Run until `shutdown` resolves. Returns the number of passes attempted.
    ///
    /// The interval is anchored to the moment this is called, so the first
    /// periodic pass happens one interval after start regardless of the
    /// startup delay.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(start + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        let mut runs = 0usize;

        tokio::select! {
            _ = &mut shutdown => return runs,
            _ = tokio::time::sleep(self.config.startup_delay) => {
                self.tick().await;
                runs += 1;
            }
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick().await;
                    runs += 1;
                }
            }
        }

        tracing::info!("score scheduler stopped after {runs} passes");
        runs
    }
}
