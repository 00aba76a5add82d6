// ABOUTME: Background tasks that accompany a mounted wizard
//
// Key components:
// - autosave: fixed-interval best-effort save timer
// - connectivity: edge-triggered online/offline monitor and HTTP probe
//
// `WizardRuntime` ties both to a shared context for the lifetime of a
// front end: `mount` starts them and `unmount` stops them, so no task
// outlives the screen that started it.

pub mod autosave;
pub mod connectivity;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use autosave::{AutoSaver, DEFAULT_AUTOSAVE_INTERVAL};
pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, ConnectivityProbe};

use crate::storage::DraftStorage;
use crate::wizard::SharedContext;

/// Running background tasks for one mounted wizard
pub struct WizardRuntime {
    autosaver: AutoSaver,
    listener: Option<JoinHandle<()>>,
}

impl WizardRuntime {
    /// Start the auto-save timer and the connectivity listener.
    ///
    /// `online` is the external connectivity signal; its current value is
    /// applied immediately and every later change is forwarded to the
    /// context, which toasts on transitions only.
    pub fn mount<S>(
        ctx: &SharedContext<S>,
        autosave_interval: Duration,
        online: watch::Receiver<bool>,
    ) -> Self
    where
        S: DraftStorage + 'static,
    {
        let mut autosaver = AutoSaver::new(autosave_interval);
        autosaver.start(ctx.clone());

        let listener = tokio::spawn(Self::listen(ctx.clone(), online));

        info!("Wizard runtime mounted");
        Self {
            autosaver,
            listener: Some(listener),
        }
    }

    async fn listen<S>(ctx: SharedContext<S>, mut online: watch::Receiver<bool>)
    where
        S: DraftStorage,
    {
        let initial = *online.borrow_and_update();
        ctx.lock().await.set_online(initial);

        while online.changed().await.is_ok() {
            let value = *online.borrow_and_update();
            ctx.lock().await.set_online(value);
        }
        debug!("Connectivity signal closed");
    }

    pub fn autosaver(&self) -> &AutoSaver {
        &self.autosaver
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Stop the timer and the listener
    pub async fn unmount(&mut self) {
        self.autosaver.stop().await;

        if let Some(listener) = self.listener.take() {
            listener.abort();
            if let Err(e) = listener.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Connectivity listener failed");
                }
            }
        }
        info!("Wizard runtime unmounted");
    }
}

impl Drop for WizardRuntime {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
