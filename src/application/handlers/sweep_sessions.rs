//! SweepSessionsHandler - Background service for periodic session cleanup.
//!
//! Each cycle asks the store to sweep the whole collection: expired sessions
//! are deleted, stale selections cleared and oversized sessions compacted.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 1h | Time between sweeps |
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel and stops after the current sweep.
//! A failed sweep is logged and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::store::{SessionStore, SessionStoreError};
use crate::domain::compaction::SweepOutcome;
use crate::domain::foundation::Timestamp;

/// Configuration for the sweeper.
#[derive(Debug, Clone)]
pub struct SweepSessionsConfig {
    /// Time between sweeps. The first sweep runs immediately.
    pub interval: Duration,
}

impl Default for SweepSessionsConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Periodically sweeps the session store.
pub struct SweepSessionsHandler {
    store: Arc<SessionStore>,
    config: SweepSessionsConfig,
}

impl SweepSessionsHandler {
    pub fn new(store: Arc<SessionStore>, config: SweepSessionsConfig) -> Self {
        Self { store, config }
    }

    /// Runs the sweep loop until the shutdown channel carries `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval_secs = self.config.interval.as_secs(), "Session sweeper started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Session sweeper stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once(Timestamp::now()).await {
                        tracing::error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
    }

    /// Runs exactly one sweep as of `now`.
    pub async fn sweep_once(&self, now: Timestamp) -> Result<SweepOutcome, SessionStoreError> {
        self.store.sweep(now).await
    }
}
