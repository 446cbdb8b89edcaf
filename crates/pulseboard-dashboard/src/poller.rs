//! Polling coordinator
//!
//! Keeps a view's resources fresh: one concurrent fetch per resource on activation, then
//! one cycle per interval until deactivation. Manual refreshes run in the caller and do
//! not move the timer. The timer task never outlives the coordinator.

use crate::error::{DashboardError, Result};
use crate::resource::PollTarget;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, instrument, warn};

type Targets = Arc<RwLock<Vec<Arc<dyn PollTarget>>>>;

/// Coordinator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorStatus {
    /// No timer armed
    Inactive,
    /// Timer armed, cycles running
    Active,
}

/// Cumulative polling statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Completed cycles, automatic and manual
    pub cycles: u64,
    /// Individual resource fetches
    pub fetches: u64,
    /// Failed resource fetches
    pub failures: u64,
    /// When the last cycle finished
    pub last_cycle: Option<DateTime<Utc>>,
}

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Whether the cycle was user-triggered
    pub manual: bool,
    /// Resources fetched
    pub fetched: usize,
    /// Resources whose fetch failed
    pub failed: usize,
    /// When the cycle finished
    pub completed_at: DateTime<Utc>,
}

impl CycleReport {
    /// Whether every fetch in the cycle succeeded
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Drives the poll cycles of one view
pub struct PollingCoordinator {
    name: String,
    interval: Duration,
    shutdown_timeout: Duration,
    targets: Targets,
    active: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
    cycle_tx: broadcast::Sender<CycleReport>,
    stats: Arc<RwLock<PollStats>>,
}

impl fmt::Debug for PollingCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingCoordinator")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("targets", &self.targets.read().len())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl PollingCoordinator {
    /// Create an inactive coordinator
    #[must_use]
    pub fn new(name: impl Into<String>, interval: Duration, shutdown_timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (cycle_tx, _) = broadcast::channel(16);
        Self {
            name: name.into(),
            interval,
            shutdown_timeout,
            targets: Arc::new(RwLock::new(Vec::new())),
            active: AtomicBool::new(false),
            task: Mutex::new(None),
            shutdown_tx,
            cycle_tx,
            stats: Arc::new(RwLock::new(PollStats::default())),
        }
    }

    /// View name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cycle interval
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Add a resource to every future cycle
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::AlreadyActive`] once the coordinator is running.
    pub fn register(&self, target: Arc<dyn PollTarget>) -> Result<()> {
        if self.active.load(Ordering::SeqCst) {
            return Err(DashboardError::AlreadyActive);
        }
        debug!(view = %self.name, resource = target.name(), "Resource registered");
        self.targets.write().push(target);
        Ok(())
    }

    /// Current lifecycle state
    #[must_use]
    pub fn status(&self) -> CoordinatorStatus {
        if self.active.load(Ordering::SeqCst) {
            CoordinatorStatus::Active
        } else {
            CoordinatorStatus::Inactive
        }
    }

    /// Cumulative statistics
    #[must_use]
    pub fn stats(&self) -> PollStats {
        self.stats.read().clone()
    }

    /// Subscribe to cycle reports
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CycleReport> {
        self.cycle_tx.subscribe()
    }

    /// Run the initial cycle and arm the timer
    ///
    /// The first timed cycle fires one full interval after activation.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::AlreadyActive`] if the coordinator is running.
    #[instrument(skip(self), fields(view = %self.name))]
    pub async fn activate(&self) -> Result<CycleReport> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DashboardError::AlreadyActive);
        }

        // Subscribed before the initial cycle so a deactivation from here on reaches the timer
        let shutdown_rx = self.shutdown_tx.subscribe();

        info!(interval_secs = self.interval.as_secs(), "Activating view");
        let report = self.run_cycle(false).await;

        // Deactivated while the initial cycle was in flight
        if !self.active.load(Ordering::SeqCst) {
            return Ok(report);
        }

        let handle = self.spawn_timer(shutdown_rx);
        if let Some(stale) = self.task.lock().replace(handle) {
            stale.abort();
        }
        Ok(report)
    }

    /// Run a cycle now without touching the timer's schedule
    ///
    /// Safe to call while a timed cycle is in flight; a response older than the value
    /// already held is dropped when it lands.
    #[instrument(skip(self), fields(view = %self.name))]
    pub async fn refresh_now(&self) -> CycleReport {
        self.run_cycle(true).await
    }

    /// Wait for the next completed cycle
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotActive`] if no timer is armed, or if the view is
    /// deactivated while waiting.
    pub async fn wait_for_cycle(&self) -> Result<CycleReport> {
        let mut rx = self.cycle_tx.subscribe();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if !self.active.load(Ordering::SeqCst) {
            return Err(DashboardError::NotActive);
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => return Err(DashboardError::NotActive),
                received = rx.recv() => match received {
                    Ok(report) => return Ok(report),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(DashboardError::NotActive);
                    }
                },
            }
        }
    }

    /// Disarm the timer and wait for its task to finish
    ///
    /// A no-op when already inactive. A task still running after the shutdown timeout
    /// is aborted.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Shutdown`] if the timer task panicked.
    #[instrument(skip(self), fields(view = %self.name))]
    pub async fn deactivate(&self) -> Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Deactivating view");
        let _ = self.shutdown_tx.send(());

        let handle = self.task.lock().take();
        let Some(mut handle) = handle else {
            return Ok(());
        };

        match tokio::time::timeout(self.shutdown_timeout, &mut handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is_cancelled() => Ok(()),
            Ok(Err(e)) => Err(DashboardError::shutdown(format!("timer task failed: {e}"))),
            Err(_) => {
                warn!("Timer task did not stop in time, aborting");
                handle.abort();
                Ok(())
            }
        }
    }

    fn spawn_timer(&self, mut shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let targets = self.targets.clone();
        let stats = self.stats.clone();
        let cycle_tx = self.cycle_tx.clone();
        let name = self.name.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        debug!(view = %name, "Timer stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        Self::cycle(&name, &targets, &stats, &cycle_tx, false).await;
                    }
                }
            }
        })
    }

    async fn run_cycle(&self, manual: bool) -> CycleReport {
        Self::cycle(&self.name, &self.targets, &self.stats, &self.cycle_tx, manual).await
    }

    async fn cycle(
        name: &str,
        targets: &Targets,
        stats: &RwLock<PollStats>,
        cycle_tx: &broadcast::Sender<CycleReport>,
        manual: bool,
    ) -> CycleReport {
        let targets: Vec<Arc<dyn PollTarget>> = targets.read().clone();
        let outcomes = join_all(targets.iter().map(|t| t.poll())).await;

        let fetched = outcomes.len();
        let failed = outcomes.iter().filter(|ok| !**ok).count();
        let report = CycleReport {
            manual,
            fetched,
            failed,
            completed_at: Utc::now(),
        };

        {
            let mut stats = stats.write();
            stats.cycles += 1;
            stats.fetches += u64::try_from(fetched).unwrap_or(u64::MAX);
            stats.failures += u64::try_from(failed).unwrap_or(u64::MAX);
            stats.last_cycle = Some(report.completed_at);
        }

        ::metrics::counter!("pulseboard_poll_cycles_total", "view" => name.to_string()).increment(1);
        debug!(view = name, manual, fetched, failed, "Poll cycle complete");

        let _ = cycle_tx.send(report.clone());
        report
    }
}

impl Drop for PollingCoordinator {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
