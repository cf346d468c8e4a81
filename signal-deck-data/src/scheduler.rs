//! Self-resynchronizing refresh loop for the dashboard dataset
//!
//! A one-second tick drives a visible countdown; when the countdown would
//! reach zero a fetch cycle runs instead and the countdown resets. A
//! hidden-to-visible transition of the host view forces an immediate cycle
//! regardless of the countdown.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use crate::client::FeedSource;
use crate::error::FeedError;
use crate::types::{AssetRecord, MacroRecord};

/// Seconds between refresh cycles
pub const REFRESH_INTERVAL_SECS: u32 = 3;

/// Refresh scheduler configuration
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Seconds between fetch cycles (the countdown start value)
    pub interval_secs: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: REFRESH_INTERVAL_SECS,
        }
    }
}

impl RefreshConfig {
    /// Set the refresh interval in seconds (minimum 1)
    pub fn with_interval_secs(mut self, secs: u32) -> Self {
        self.interval_secs = secs.max(1);
        self
    }
}

/// Dashboard dataset plus the refresh bookkeeping the UI displays
///
/// Replaced half-by-half on successful fetch cycles; a failed cycle leaves
/// the previous data on display (stale-but-displayed is the policy, not an
/// error state).
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// True only before the first completed fetch cycle
    pub loading: bool,
    /// Seconds until the next scheduled refresh, never below 1
    pub countdown: u32,
    /// Wall-clock time of the last completed fetch attempt
    pub last_sync: Option<DateTime<Utc>>,
    /// Asset records in feed order
    pub assets: Vec<AssetRecord>,
    /// Macro records in feed order
    pub macros: Vec<MacroRecord>,
}

impl DashboardState {
    fn new(countdown: u32) -> Self {
        Self {
            loading: true,
            countdown,
            last_sync: None,
            assets: Vec::new(),
            macros: Vec::new(),
        }
    }
}

/// Fixed-interval polling loop with countdown and visibility resync
///
/// Owns the dashboard dataset; the UI reads point-in-time snapshots. One
/// scheduler instance per dashboard, explicitly torn down with
/// [`stop`](Self::stop) so no tick outlives the consumer.
pub struct RefreshScheduler {
    state: Arc<Mutex<DashboardState>>,
    visibility_tx: watch::Sender<bool>,
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Start polling: one immediate fetch cycle, then one tick per second
    pub fn start(source: impl FeedSource, config: RefreshConfig) -> Self {
        let state = Arc::new(Mutex::new(DashboardState::new(config.interval_secs)));
        let (visibility_tx, visibility_rx) = watch::channel(true);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let loop_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            run_refresh_loop(source, config, loop_state, visibility_rx, shutdown_rx).await;
        });

        Self {
            state,
            visibility_tx,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Point-in-time copy of the dashboard state
    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    /// Report host visibility
    ///
    /// A hidden-to-visible transition forces an immediate fetch cycle; all
    /// other transitions only record the new state.
    pub fn set_visible(&self, visible: bool) {
        let _ = self.visibility_tx.send(visible);
    }

    /// Stop the tick and detach the visibility listener (idempotent)
    ///
    /// An in-flight fetch cycle completes (and may still write the dataset)
    /// before the task exits; no further trigger is ever processed.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown_tx.send(()).await;
            let _ = handle.await;
        }
    }
}

/// Scheduler task: ticks drive the countdown, visibility edges force a
/// resync, shutdown drains at the next await point
async fn run_refresh_loop<S: FeedSource>(
    source: S,
    config: RefreshConfig,
    state: Arc<Mutex<DashboardState>>,
    mut visibility_rx: watch::Receiver<bool>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    info!(
        interval_secs = config.interval_secs,
        "starting refresh scheduler"
    );

    run_fetch_cycle(&source, &state, config.interval_secs).await;

    let tick = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut visible = *visibility_rx.borrow();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let due = {
                    let mut guard = state.lock().await;
                    if guard.countdown <= 1 {
                        true
                    } else {
                        guard.countdown -= 1;
                        false
                    }
                };
                if due {
                    run_fetch_cycle(&source, &state, config.interval_secs).await;
                }
            }
            changed = visibility_rx.changed() => {
                if changed.is_err() {
                    // Scheduler handle dropped without stop(); nothing left to resync for
                    break;
                }
                let now_visible = *visibility_rx.borrow_and_update();
                if now_visible && !visible {
                    debug!("visibility regained, forcing refresh");
                    run_fetch_cycle(&source, &state, config.interval_secs).await;
                }
                visible = now_visible;
            }
            _ = shutdown_rx.recv() => {
                info!("refresh scheduler stopped");
                break;
            }
        }
    }
}

/// One fetch cycle: both feeds read concurrently, each half of the dataset
/// applied independently
///
/// A non-success status leaves only that feed's half stale. A transport or
/// decode failure aborts the cycle: dataset and last-sync marker stay
/// untouched. `loading` clears and the countdown resets on every attempt.
async fn run_fetch_cycle<S: FeedSource>(
    source: &S,
    state: &Mutex<DashboardState>,
    interval_secs: u32,
) {
    let (assets, macros) = tokio::join!(source.fetch_assets(), source.fetch_macros());

    let aborted = assets.as_ref().err().is_some_and(|e| e.aborts_cycle())
        || macros.as_ref().err().is_some_and(|e| e.aborts_cycle());

    let mut guard = state.lock().await;

    if aborted {
        for err in [assets.as_ref().err(), macros.as_ref().err()]
            .into_iter()
            .flatten()
        {
            error!(%err, "fetch cycle aborted, keeping previous dataset");
        }
    } else {
        apply_half(&mut guard.assets, assets, "assets");
        apply_half(&mut guard.macros, macros, "macro");
        guard.last_sync = Some(Utc::now());
    }

    guard.loading = false;
    guard.countdown = interval_secs;
}

fn apply_half<T>(slot: &mut Vec<T>, fetched: Result<Vec<T>, FeedError>, feed: &'static str) {
    match fetched {
        Ok(records) => {
            debug!(feed, count = records.len(), "feed refreshed");
            *slot = records;
        }
        Err(err) => warn!(%err, feed, "feed failed, keeping stale half"),
    }
}
