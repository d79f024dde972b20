//! Background purge of aged ride-history records.
//!
//! The sweeper runs on its own task with its own handle to the history
//! store, independent of request handling. Each tick deletes everything past
//! the retention window in one self-contained batch; stopping between ticks
//! loses nothing but time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::store::HistoryStore;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Age past which archival records are dropped.
pub const RETENTION_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub sweep_interval: Duration,
    pub retention: chrono::Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            sweep_interval: SWEEP_INTERVAL,
            retention: chrono::Duration::days(RETENTION_DAYS),
        }
    }
}

pub struct HistorySweeper {
    history: Arc<HistoryStore>,
    policy: RetentionPolicy,
}

impl HistorySweeper {
    pub fn new(history: Arc<HistoryStore>) -> Self {
        Self::with_policy(history, RetentionPolicy::default())
    }

    pub fn with_policy(history: Arc<HistoryStore>, policy: RetentionPolicy) -> Self {
        Self { history, policy }
    }

    /// Delete every record older than the retention window. Idempotent: a
    /// sweep that finds nothing past the window is a no-op.
    pub async fn sweep_once(&self) -> usize {
        let cutoff = Utc::now() - self.policy.retention;
        let removed = self.history.purge_older_than(cutoff).await;
        if removed > 0 {
            info!(removed, "purged ride history records past retention");
        } else {
            debug!("no ride history records past retention");
        }
        removed
    }

    /// Sweep on the configured interval until the shutdown signal fires.
    /// The first sweep runs immediately on start.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.policy.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("history sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }
}
