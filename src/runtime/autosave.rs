// ABOUTME: Auto-save timer that periodically persists the wizard draft while online
// ABOUTME: Best effort: offline ticks are skipped and errors are only logged, the next tick retries

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::storage::DraftStorage;
use crate::wizard::{AutoSaveOutcome, SharedContext};

/// Default interval between auto-save ticks
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Background auto-save task.
///
/// Every `interval` it locks the shared context and runs its save routine.
/// There is no backoff: a skipped or failed tick is simply retried on the
/// next one.
pub struct AutoSaver {
    /// Interval between save attempts.
    interval: Duration,

    /// Shutdown flag for graceful termination.
    shutdown: Arc<AtomicBool>,

    /// Handle to the background task.
    handle: Option<JoinHandle<()>>,

    /// Number of ticks that actually wrote a snapshot.
    saves: Arc<AtomicU64>,
}

impl AutoSaver {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
            saves: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start the timer against `ctx`
    pub fn start<S>(&mut self, ctx: SharedContext<S>)
    where
        S: DraftStorage + 'static,
    {
        if self.handle.is_some() {
            debug!("Auto-save already running");
            return;
        }
        self.shutdown.store(false, Ordering::SeqCst);

        let shutdown = Arc::clone(&self.shutdown);
        let saves = Arc::clone(&self.saves);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            Self::save_loop(ctx, interval, shutdown, saves).await;
        });

        self.handle = Some(handle);
        info!(interval_ms = %self.interval.as_millis(), "Auto-save started");
    }

    /// Stop the timer. No tick runs after this returns.
    pub async fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Auto-save task failed");
                }
            }
            info!("Auto-save stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shutdown.load(Ordering::SeqCst)
    }

    /// Number of snapshots written by the timer so far
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    async fn save_loop<S>(
        ctx: SharedContext<S>,
        interval: Duration,
        shutdown: Arc<AtomicBool>,
        saves: Arc<AtomicU64>,
    ) where
        S: DraftStorage,
    {
        debug!("Auto-save loop started");

        loop {
            tokio::time::sleep(interval).await;

            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            let outcome = ctx.lock().await.auto_save();
            match outcome {
                Ok(AutoSaveOutcome::Saved) => {
                    saves.fetch_add(1, Ordering::SeqCst);
                    debug!("Auto-saved wizard draft");
                }
                Ok(skipped) => debug!(?skipped, "Auto-save skipped"),
                Err(e) => warn!(error = %e, "Auto-save failed, will retry next tick"),
            }
        }

        debug!("Auto-save loop ended");
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
