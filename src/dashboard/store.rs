//! Snapshot store — single owner of "what we currently believe is true"
//! about the project.
//!
//! A fetch replaces the whole snapshot atomically and bumps the generation
//! counter. The only other mutation paths are the two optimistic patches,
//! and those apply solely against the generation they were recorded for:
//! once a newer snapshot has landed, a stale patch is dropped rather than
//! merged.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::portal_api::{PortalApi, PortalError};
use crate::types::{Message, ProjectSnapshot};

/// What the dashboard currently holds.
#[derive(Debug)]
enum SnapshotState {
    /// Nothing fetched yet.
    Empty,
    Ready(ProjectSnapshot),
    /// Retryable fetch failure. No partial snapshot is kept alongside it.
    Failed { message: String },
}

/// Result of one fetch, from the caller's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A fresh snapshot is in place.
    Ready,
    /// The session is gone; the caller must route to the entry surface.
    /// Never stored as an in-page error.
    RedirectToLogin,
    /// Retryable failure; the store is in the error state and a subsequent
    /// `fetch` is the retry.
    Failed,
}

/// An optimistic local mutation, recorded against a specific generation.
#[derive(Debug, Clone)]
pub enum SnapshotPatch {
    /// Prepend the canonical server-returned message to the thread.
    PrependMessage(Message),
    /// Zero the unread badge and flip every message's unread flag off.
    ClearUnread,
}

struct Inner {
    state: SnapshotState,
    generation: u64,
}

/// Shared owner of the last-fetched project snapshot.
pub struct SnapshotStore {
    api: Arc<dyn PortalApi>,
    inner: Mutex<Inner>,
}

impl SnapshotStore {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner {
                state: SnapshotState::Empty,
                generation: 0,
            }),
        }
    }

    /// Fetch the full snapshot and replace the held one wholesale.
    ///
    /// The remote call runs outside the lock; whichever fetch settles last
    /// wins, and every patch recorded against an older generation is
    /// superseded.
    pub async fn fetch(&self) -> FetchOutcome {
        match self.api.fetch_snapshot().await {
            Ok(snapshot) => {
                if !snapshot.unread_count_consistent() {
                    log::warn!(
                        "snapshot unread badge {} disagrees with {} flagged messages",
                        snapshot.unread_count,
                        snapshot.unread_messages()
                    );
                }
                let mut inner = self.inner.lock();
                inner.state = SnapshotState::Ready(snapshot);
                inner.generation += 1;
                log::info!("snapshot replaced (generation {})", inner.generation);
                FetchOutcome::Ready
            }
            Err(PortalError::NotAuthenticated) => {
                log::info!("snapshot fetch rejected: not authenticated");
                FetchOutcome::RedirectToLogin
            }
            Err(e) => {
                log::warn!("snapshot fetch failed: {}", e);
                let mut inner = self.inner.lock();
                inner.state = SnapshotState::Failed {
                    message: e.to_string(),
                };
                FetchOutcome::Failed
            }
        }
    }

    /// Generation of the most recently settled snapshot.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn has_snapshot(&self) -> bool {
        matches!(self.inner.lock().state, SnapshotState::Ready(_))
    }

    /// The retryable fetch error, if the store is in the error state.
    pub fn error(&self) -> Option<String> {
        match &self.inner.lock().state {
            SnapshotState::Failed { message } => Some(message.clone()),
            _ => None,
        }
    }

    /// Clone of the held snapshot, if any.
    pub fn snapshot(&self) -> Option<ProjectSnapshot> {
        match &self.inner.lock().state {
            SnapshotState::Ready(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Read the held snapshot together with its generation, without cloning.
    pub fn read<R>(&self, f: impl FnOnce(u64, &ProjectSnapshot) -> R) -> Option<R> {
        let inner = self.inner.lock();
        match &inner.state {
            SnapshotState::Ready(s) => Some(f(inner.generation, s)),
            _ => None,
        }
    }

    /// Apply an optimistic patch recorded against `generation`.
    ///
    /// Returns `false` (dropping the patch) when a newer snapshot has landed
    /// since the patch was recorded, or when no snapshot is held.
    pub fn apply(&self, generation: u64, patch: SnapshotPatch) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            log::debug!(
                "optimistic patch for generation {} dropped (store at {})",
                generation,
                inner.generation
            );
            return false;
        }
        let SnapshotState::Ready(snapshot) = &mut inner.state else {
            return false;
        };
        match patch {
            SnapshotPatch::PrependMessage(message) => {
                if message.unread {
                    snapshot.unread_count += 1;
                }
                snapshot.messages.insert(0, message);
            }
            SnapshotPatch::ClearUnread => {
                snapshot.unread_count = 0;
                for message in &mut snapshot.messages {
                    message.unread = false;
                }
            }
        }
        true
    }
}
