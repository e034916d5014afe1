//! Client project dashboard — synchronization core.
//!
//! Data flows one direction at rest (portal service → snapshot store →
//! views) and is punctuated by write operations that either optimistically
//! patch the store or trigger a full refetch. The [`Dashboard`] facade wires
//! the pieces around one shared [`PortalApi`] handle and owns the background
//! refresh poller's lifecycle.

pub mod approvals;
pub mod messages;
mod poller;
pub mod store;
pub mod uploads;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::PortalConfig;
use crate::portal_api::PortalApi;

use approvals::ApprovalWorkflow;
use messages::MessageThread;
use store::{FetchOutcome, SnapshotStore};
use uploads::UploadPipeline;
use views::ViewCoordinator;

struct PollerHandle {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// The client dashboard's stateful core for a single project.
pub struct Dashboard {
    store: Arc<SnapshotStore>,
    approvals: ApprovalWorkflow,
    messages: Arc<MessageThread>,
    uploads: UploadPipeline,
    views: ViewCoordinator,
    api: Arc<dyn PortalApi>,
    poll_interval: Duration,
    poller: parking_lot::Mutex<Option<PollerHandle>>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn PortalApi>, config: &PortalConfig) -> Self {
        let store = Arc::new(SnapshotStore::new(api.clone()));
        let messages = Arc::new(MessageThread::new(api.clone(), store.clone()));
        Self {
            approvals: ApprovalWorkflow::new(api.clone(), store.clone()),
            uploads: UploadPipeline::new(api.clone(), store.clone()),
            views: ViewCoordinator::new(store.clone(), messages.clone()),
            store,
            messages,
            api,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            poller: parking_lot::Mutex::new(None),
        }
    }

    /// Run the initial snapshot fetch. `RedirectToLogin` means the caller
    /// must route to the entry surface instead of rendering the dashboard.
    pub async fn initialize(&self) -> FetchOutcome {
        self.store.fetch().await
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn approvals(&self) -> &ApprovalWorkflow {
        &self.approvals
    }

    pub fn messages(&self) -> &MessageThread {
        &self.messages
    }

    pub fn uploads(&self) -> &UploadPipeline {
        &self.uploads
    }

    pub fn views(&self) -> &ViewCoordinator {
        &self.views
    }

    /// End the portal session. The caller redirects to the entry surface
    /// regardless of whether the remote call succeeded, so a failure here
    /// is logged and swallowed.
    pub async fn log_out(&self) {
        self.stop_refresh_poller().await;
        if let Err(e) = self.api.log_out().await {
            log::warn!("logout call failed (redirecting anyway): {}", e);
        }
    }

    /// Start the background refresh poller. A zero configured interval
    /// disables polling; starting twice is a no-op.
    pub fn start_refresh_poller(&self) {
        if self.poll_interval.is_zero() {
            log::info!("refresh polling disabled by configuration");
            return;
        }
        let mut poller = self.poller.lock();
        if poller.is_some() {
            return;
        }
        let shutdown = Arc::new(Notify::new());
        let handle =
            poller::spawn_refresh_poller(self.store.clone(), self.poll_interval, shutdown.clone());
        *poller = Some(PollerHandle { shutdown, handle });
    }

    /// Stop the refresh poller and wait for it to exit. Safe to call when
    /// no poller is running.
    pub async fn stop_refresh_poller(&self) {
        let Some(PollerHandle { shutdown, handle }) = self.poller.lock().take() else {
            return;
        };
        shutdown.notify_one();
        if let Err(e) = handle.await {
            log::warn!("refresh poller did not exit cleanly: {}", e);
        }
    }
}
