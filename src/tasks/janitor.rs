//! Janitor Task
//!
//! Background thread that periodically sweeps expired cache entries.
//!
//! The thread drives its own single-threaded Tokio runtime, so a janitor
//! runs whether or not the caller has a runtime of its own.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::cache::StoreInner;

/// Handle to the sweeper bound to one cache store.
///
/// `stop` consumes the handle, so a janitor can only be stopped once.
/// Dropping the handle sends the same stop signal.
#[derive(Debug)]
pub struct Janitor {
    interval: Duration,
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Starts a janitor thread sweeping `store` every `interval`.
    ///
    /// Returns `None` when `interval` is zero, or when the thread or its
    /// runtime cannot be created.
    pub(crate) fn start(store: Arc<StoreInner>, interval: Duration) -> Option<Self> {
        if interval.is_zero() {
            return None;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        match spawn_thread(store, interval, stop_rx) {
            Ok(handle) => Some(Self {
                interval,
                stop_tx,
                handle: Some(handle),
            }),
            Err(e) => {
                error!("Failed to start janitor thread: {}", e);
                None
            }
        }
    }

    /// Interval between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signals the thread to stop and returns its join handle.
    ///
    /// A sweep already in progress completes; no final sweep is run.
    pub fn stop(mut self) -> Option<JoinHandle<()>> {
        let _ = self.stop_tx.send(true);
        self.handle.take()
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

fn spawn_thread(
    store: Arc<StoreInner>,
    interval: Duration,
    stop_rx: watch::Receiver<bool>,
) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    thread::Builder::new()
        .name("kv-janitor".to_string())
        .spawn(move || runtime.block_on(run(store, interval, stop_rx)))
}

async fn run(store: Arc<StoreInner>, interval: Duration, mut stop_rx: watch::Receiver<bool>) {
    info!("Starting janitor with interval of {:?}", interval);

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; sweeps start one interval in.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            // Stop wins over a tick that is ready at the same time.
            _ = stop_rx.changed() => {
                break;
            }
            _ = ticker.tick() => {
                let removed = store.delete_expired();
                if removed > 0 {
                    info!("Janitor sweep: removed {} expired entries", removed);
                } else {
                    debug!("Janitor sweep: no expired entries found");
                }
            }
        }
    }

    info!("Janitor stopped");
}
