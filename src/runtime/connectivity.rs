// ABOUTME: Connectivity detection for the wizard
// ABOUTME: Edge-triggered online/offline tracking fed from a watch signal, plus an HTTP probe that drives it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ReachabilityCheck;

/// Capacity of the transition broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A change in connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityEvent {
    WentOffline,
    Restored,
}

impl ConnectivityEvent {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

/// Tracks the current online flag and reports only transitions
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: bool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            online: initially_online,
            events,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Receive every future transition
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// Apply an observation. Returns the transition if the flag flipped.
    pub fn update(&mut self, online: bool) -> Option<ConnectivityEvent> {
        if online == self.online {
            return None;
        }
        self.online = online;

        let event = if online {
            ConnectivityEvent::Restored
        } else {
            ConnectivityEvent::WentOffline
        };
        info!(?event, "Connectivity changed");
        // No subscribers is fine
        let _ = self.events.send(event);
        Some(event)
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Periodically checks reachability and publishes the result on a watch channel.
pub struct ConnectivityProbe {
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ConnectivityProbe {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start probing `target`, publishing on `signal`.
    ///
    /// Only changes are published, so an unchanged result does not wake
    /// the listener.
    pub fn start<C>(&mut self, target: C, signal: watch::Sender<bool>)
    where
        C: ReachabilityCheck + 'static,
    {
        self.shutdown.store(false, Ordering::SeqCst);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            debug!("Connectivity probe started");
            loop {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }

                let online = target.is_reachable().await;
                signal.send_if_modified(|current| {
                    if *current == online {
                        false
                    } else {
                        *current = online;
                        true
                    }
                });

                tokio::time::sleep(interval).await;
            }
            debug!("Connectivity probe ended");
        });

        self.handle = Some(handle);
        info!(interval_ms = %self.interval.as_millis(), "Connectivity probe started");
    }

    pub async fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Connectivity probe task failed");
                }
            }
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shutdown.load(Ordering::SeqCst)
    }
}
