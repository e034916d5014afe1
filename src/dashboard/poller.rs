//! Background snapshot refresh poller.
//!
//! Runs as a long-lived task: sleep the configured interval, refetch, loop.
//! Stops permanently when a tick reports the session is gone, and exits
//! promptly when the owning dashboard signals shutdown. A torn-down
//! dashboard must not leave a timer running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::store::{FetchOutcome, SnapshotStore};

pub(crate) fn spawn_refresh_poller(
    store: Arc<SnapshotStore>,
    interval: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(run_refresh_poller(store, interval, shutdown))
}

async fn run_refresh_poller(store: Arc<SnapshotStore>, interval: Duration, shutdown: Arc<Notify>) {
    log::info!("refresh poller started (every {:?})", interval);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.notified() => {
                log::info!("refresh poller shutting down");
                return;
            }
        }

        match store.fetch().await {
            FetchOutcome::Ready => log::debug!("refresh poller: snapshot updated"),
            FetchOutcome::RedirectToLogin => {
                // The session is gone; keep quiet and let the foreground
                // fetch route the user to the entry surface.
                log::info!("refresh poller: not authenticated, stopping");
                return;
            }
            FetchOutcome::Failed => {
                log::warn!("refresh poller: tick failed, will retry next interval");
            }
        }
    }
}
