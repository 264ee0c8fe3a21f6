//! Staleness Reaper Service
//!
//! Background service that periodically deactivates officers whose last
//! location report is older than the staleness threshold.
//!
//! # Behavior
//!
//! - Staleness is computed from the stored `last_update`, never from an
//!   in-process timer, so a restart loses nothing
//! - Deactivations go through the registry and reach viewers as ordinary
//!   removal updates
//! - Each sweep also reverts officers still marked on patrol for a schedule
//!   whose end time has passed, since an ending schedule sends no event
//! - A failed sweep is logged and retried with exponential backoff; the next
//!   success restores the normal interval

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::metrics;
use tanod_core::constants::{
    DEFAULT_STALE_AFTER_SECS, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_SWEEP_MAX_BACKOFF_SECS,
};
use tanod_core::TrackingResult;
use tanod_db::RegistryService;

/// Configuration for the staleness reaper
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Interval between sweeps
    pub sweep_interval: Duration,
    /// Upper bound for the retry delay after failed sweeps
    pub max_backoff: Duration,
    /// Records older than this are deactivated
    pub stale_after: chrono::Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_backoff: Duration::from_secs(DEFAULT_SWEEP_MAX_BACKOFF_SECS),
            stale_after: chrono::Duration::seconds(DEFAULT_STALE_AFTER_SECS as i64),
        }
    }
}

/// Exponential backoff for failed sweeps
#[derive(Debug, Clone)]
pub struct SweepBackoff {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl SweepBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// Delay before retrying after `attempt` consecutive failures (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Counters exposed by a running reaper
#[derive(Debug, Default)]
pub struct ReaperStats {
    pub sweeps: AtomicU64,
    pub failures: AtomicU64,
    pub expired: AtomicU64,
    pub patrols_ended: AtomicU64,
}

/// Result of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Officers deactivated as stale
    pub expired: usize,
    /// Officers reverted because their patrol schedule ended
    pub patrols_ended: usize,
}

impl ReaperStats {
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn expired(&self) -> u64 {
        self.expired.load(Ordering::Relaxed)
    }

    pub fn patrols_ended(&self) -> u64 {
        self.patrols_ended.load(Ordering::Relaxed)
    }
}

/// Staleness reaper
pub struct ReaperService {
    registry: Arc<RegistryService>,
    config: ReaperConfig,
    stats: Arc<ReaperStats>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ReaperService {
    pub fn new(registry: Arc<RegistryService>, config: ReaperConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            registry,
            config,
            stats: Arc::new(ReaperStats::default()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run one sweep now
    pub async fn sweep_once(&self) -> TrackingResult<SweepOutcome> {
        let now = Utc::now();
        let patrols_ended = self.registry.expire_ended_patrols(now).await?;
        let expired = self
            .registry
            .expire_stale(now, self.config.stale_after)
            .await?;
        Ok(SweepOutcome {
            expired: expired.len(),
            patrols_ended: patrols_ended.len(),
        })
    }

    /// Start the reaper in a background task
    pub fn start(self) -> ReaperHandle {
        let shutdown_tx = self.shutdown_tx.clone();
        let stats = self.stats.clone();

        let task_handle = tokio::spawn(async move {
            self.run_loop().await;
        });

        ReaperHandle {
            shutdown_tx,
            task_handle,
            stats,
        }
    }

    async fn run_loop(self) {
        let backoff = SweepBackoff::new(self.config.sweep_interval, self.config.max_backoff);
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut consecutive_failures: u32 = 0;
        let mut delay = self.config.sweep_interval;

        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            stale_after_secs = self.config.stale_after.num_seconds(),
            "Staleness reaper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    self.stats.sweeps.fetch_add(1, Ordering::Relaxed);
                    match self.sweep_once().await {
                        Ok(outcome) => {
                            if consecutive_failures > 0 {
                                info!(consecutive_failures, "Staleness sweep recovered");
                            }
                            consecutive_failures = 0;
                            delay = self.config.sweep_interval;

                            if outcome.expired > 0 {
                                self.stats.expired.fetch_add(outcome.expired as u64, Ordering::Relaxed);
                                metrics::record_stale_deactivations(outcome.expired);
                            }
                            if outcome.patrols_ended > 0 {
                                self.stats
                                    .patrols_ended
                                    .fetch_add(outcome.patrols_ended as u64, Ordering::Relaxed);
                                metrics::record_ended_patrols(outcome.patrols_ended);
                            }
                            debug!(
                                expired = outcome.expired,
                                patrols_ended = outcome.patrols_ended,
                                "Staleness sweep finished"
                            );
                        }
                        Err(e) => {
                            consecutive_failures += 1;
                            delay = backoff.delay_for_attempt(consecutive_failures);
                            self.stats.failures.fetch_add(1, Ordering::Relaxed);
                            metrics::record_sweep_failure();

                            warn!(
                                error = %e,
                                consecutive_failures,
                                retry_in_ms = delay.as_millis() as u64,
                                "Staleness sweep failed"
                            );
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Staleness reaper shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Handle for controlling the reaper
pub struct ReaperHandle {
    shutdown_tx: watch::Sender<bool>,
    task_handle: tokio::task::JoinHandle<()>,
    stats: Arc<ReaperStats>,
}

impl ReaperHandle {
    /// Stop the reaper and wait for the task to end
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task_handle.await;
        info!("Staleness reaper stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    pub fn stats(&self) -> &ReaperStats {
        &self.stats
    }
}
