//! Deliverable approval workflow.
//!
//! Lifecycle: `pending` → `approved` (terminal) or `pending` →
//! `changes_requested` (terminal from the dashboard's side, which only
//! displays the requested feedback). The server owns `approved_at`, so a
//! successful action triggers a full snapshot refetch rather than a local
//! patch.
//!
//! Concurrency: one action may be in flight per approval id, enforced by a
//! guard set. Actions on different approvals stay independent: a pending
//! approve on #7 never disables the buttons on #9.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::store::{FetchOutcome, SnapshotStore};
use crate::portal_api::{PortalApi, PortalError};
use crate::types::{Approval, ApprovalStatus};

/// Errors from an approval action. Validation and guard variants are local
/// and mean no network call was made.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalActionError {
    #[error("Approval {0} is not awaiting a decision")]
    NotPending(u64),
    #[error("Approval {0} already has an action in flight")]
    AlreadyProcessing(u64),
    #[error("Feedback is required when requesting changes")]
    EmptyFeedback,
    #[error(transparent)]
    Portal(#[from] PortalError),
}

/// Derived display partition: every approval lands in exactly one bucket.
#[derive(Debug, Clone, Default)]
pub struct ApprovalBuckets {
    pub pending: Vec<Approval>,
    pub changes_requested: Vec<Approval>,
    pub approved: Vec<Approval>,
}

impl ApprovalBuckets {
    pub fn partition(approvals: &[Approval]) -> Self {
        let mut buckets = Self::default();
        for approval in approvals {
            match approval.status {
                ApprovalStatus::Pending => buckets.pending.push(approval.clone()),
                ApprovalStatus::ChangesRequested => {
                    buckets.changes_requested.push(approval.clone())
                }
                ApprovalStatus::Approved => buckets.approved.push(approval.clone()),
            }
        }
        buckets
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.changes_requested.len() + self.approved.len()
    }
}

pub struct ApprovalWorkflow {
    api: Arc<dyn PortalApi>,
    store: Arc<SnapshotStore>,
    in_flight: Mutex<HashSet<u64>>,
}

impl ApprovalWorkflow {
    pub fn new(api: Arc<dyn PortalApi>, store: Arc<SnapshotStore>) -> Self {
        Self {
            api,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Approve a pending deliverable, with an optional note.
    ///
    /// On success the snapshot is refetched in full; until that refetch
    /// settles the id stays in the processing set, so its action buttons
    /// remain disabled and a double submission cannot slip through.
    pub async fn approve(&self, id: u64, note: Option<&str>) -> Result<(), ApprovalActionError> {
        self.ensure_pending(id)?;
        self.begin(id)?;

        match self.api.approve_deliverable(id, note).await {
            Ok(()) => {
                self.refetch_after_action("approve", id).await;
                self.finish(id);
                Ok(())
            }
            Err(e) => {
                log::warn!("approve failed for approval {}: {}", id, e);
                self.finish(id);
                Err(e.into())
            }
        }
    }

    /// Request changes on a pending deliverable. Feedback is mandatory:
    /// empty or whitespace-only feedback fails locally, before any network
    /// call.
    pub async fn request_changes(
        &self,
        id: u64,
        feedback: &str,
    ) -> Result<(), ApprovalActionError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(ApprovalActionError::EmptyFeedback);
        }
        self.ensure_pending(id)?;
        self.begin(id)?;

        match self.api.request_changes(id, feedback).await {
            Ok(()) => {
                self.refetch_after_action("request_changes", id).await;
                self.finish(id);
                Ok(())
            }
            Err(e) => {
                log::warn!("request_changes failed for approval {}: {}", id, e);
                self.finish(id);
                Err(e.into())
            }
        }
    }

    /// Whether an action is currently in flight for this approval.
    pub fn processing(&self, id: u64) -> bool {
        self.in_flight.lock().contains(&id)
    }

    pub fn processing_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.in_flight.lock().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Bucket partition of the current snapshot's approvals.
    pub fn buckets(&self) -> ApprovalBuckets {
        self.store
            .read(|_, snapshot| ApprovalBuckets::partition(&snapshot.approvals))
            .unwrap_or_default()
    }

    fn ensure_pending(&self, id: u64) -> Result<(), ApprovalActionError> {
        let pending = self
            .store
            .read(|_, snapshot| {
                snapshot
                    .approval(id)
                    .map(|a| a.status == ApprovalStatus::Pending)
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        if pending {
            Ok(())
        } else {
            Err(ApprovalActionError::NotPending(id))
        }
    }

    fn begin(&self, id: u64) -> Result<(), ApprovalActionError> {
        if !self.in_flight.lock().insert(id) {
            return Err(ApprovalActionError::AlreadyProcessing(id));
        }
        Ok(())
    }

    fn finish(&self, id: u64) {
        self.in_flight.lock().remove(&id);
    }

    async fn refetch_after_action(&self, action: &str, id: u64) {
        if self.store.fetch().await != FetchOutcome::Ready {
            // The action itself succeeded; the store carries the retryable
            // fetch error and the next refresh reconciles the display.
            log::warn!("refetch after {} of approval {} did not land", action, id);
        }
    }
}
