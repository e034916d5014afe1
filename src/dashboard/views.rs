//! View activation coordinator.
//!
//! The dashboard exposes a small fixed set of named views. Switching is a
//! pure local state change with exactly one side effect: entering the
//! messages view marks unread messages read. The preview view is a member
//! of the valid-view set only while the project has previews enabled; it
//! is not merely hidden.

use std::sync::Arc;

use parking_lot::Mutex;

use super::messages::MessageThread;
use super::store::SnapshotStore;
use crate::types::Project;

/// One dashboard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    Overview,
    Messages,
    Files,
    Approvals,
    Preview,
}

impl DashboardView {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardView::Overview => "overview",
            DashboardView::Messages => "messages",
            DashboardView::Files => "files",
            DashboardView::Approvals => "approvals",
            DashboardView::Preview => "preview",
        }
    }
}

/// Views the given project actually offers.
pub fn available_views(project: &Project) -> Vec<DashboardView> {
    let mut views = vec![
        DashboardView::Overview,
        DashboardView::Messages,
        DashboardView::Files,
        DashboardView::Approvals,
    ];
    if project.preview_enabled {
        views.push(DashboardView::Preview);
    }
    views
}

#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error("Preview is not enabled for this project")]
    PreviewUnavailable,
}

/// Result of a view switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewActivation {
    pub view: DashboardView,
    /// Whether entering the messages view confirmed a mark-all-read.
    pub marked_read: bool,
}

pub struct ViewCoordinator {
    store: Arc<SnapshotStore>,
    thread: Arc<MessageThread>,
    active: Mutex<DashboardView>,
}

impl ViewCoordinator {
    pub fn new(store: Arc<SnapshotStore>, thread: Arc<MessageThread>) -> Self {
        Self {
            store,
            thread,
            active: Mutex::new(DashboardView::Overview),
        }
    }

    pub fn active(&self) -> DashboardView {
        *self.active.lock()
    }

    /// Switch the active view.
    ///
    /// Re-activating the current view fires no side effect, so a re-render
    /// of the messages section cannot re-issue mark-as-read. A failed
    /// mark-as-read is contained: the switch still succeeds and the unread
    /// state stays as it was.
    pub async fn activate(&self, view: DashboardView) -> Result<ViewActivation, ActivateError> {
        if view == DashboardView::Preview {
            let offered = self
                .store
                .read(|_, snapshot| snapshot.project.preview_enabled)
                .unwrap_or(false);
            if !offered {
                return Err(ActivateError::PreviewUnavailable);
            }
        }

        {
            let mut active = self.active.lock();
            if *active == view {
                return Ok(ViewActivation {
                    view,
                    marked_read: false,
                });
            }
            *active = view;
        }
        log::debug!("view activated: {}", view.as_str());

        let mut marked_read = false;
        if view == DashboardView::Messages {
            match self.thread.mark_read_if_unread().await {
                Ok(confirmed) => marked_read = confirmed,
                Err(e) => log::warn!("mark-as-read on entering messages failed: {}", e),
            }
        }

        Ok(ViewActivation { view, marked_read })
    }
}
