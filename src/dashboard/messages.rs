//! Message thread tracker.
//!
//! Owns the two optimistic mutations the thread is allowed to make against
//! the snapshot store: prepending the canonical server-returned message
//! after a send, and clearing the unread state after a confirmed
//! mark-all-read. Both are recorded against the generation current when the
//! request went out, so a refetch landing in between supersedes them.

use std::sync::Arc;

use parking_lot::Mutex;

use super::store::{SnapshotPatch, SnapshotStore};
use crate::portal_api::{PortalApi, PortalError};
use crate::types::Message;

/// Errors from sending a message. The local variants mean no network call
/// was made and the caller's draft is untouched.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Message text is empty")]
    EmptyText,
    #[error("A send is already in flight")]
    SendInFlight,
    #[error(transparent)]
    Portal(#[from] PortalError),
}

pub struct MessageThread {
    api: Arc<dyn PortalApi>,
    store: Arc<SnapshotStore>,
    sending: Mutex<bool>,
}

impl MessageThread {
    pub fn new(api: Arc<dyn PortalApi>, store: Arc<SnapshotStore>) -> Self {
        Self {
            api,
            store,
            sending: Mutex::new(false),
        }
    }

    /// Whether a send is in flight (the compose action is disabled).
    pub fn sending(&self) -> bool {
        *self.sending.lock()
    }

    /// Send a thread message and optimistically prepend the server's
    /// canonical copy.
    ///
    /// On failure nothing is mutated locally; the caller keeps the draft
    /// and may retry the same text.
    pub async fn send(&self, text: &str) -> Result<Message, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyText);
        }
        {
            let mut sending = self.sending.lock();
            if *sending {
                return Err(SendError::SendInFlight);
            }
            *sending = true;
        }

        let generation = self.store.generation();
        let result = self.api.send_message(text).await;
        *self.sending.lock() = false;

        match result {
            Ok(message) => {
                if !self
                    .store
                    .apply(generation, SnapshotPatch::PrependMessage(message.clone()))
                {
                    log::debug!("sent message {} superseded by a newer snapshot", message.id);
                }
                Ok(message)
            }
            Err(e) => {
                log::warn!("message send failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Issue mark-all-read if the held snapshot has unread messages.
    ///
    /// Returns `true` when a remote call was made and confirmed. Called by
    /// the view coordinator on the transition into the messages view, not
    /// on every re-render of it.
    pub async fn mark_read_if_unread(&self) -> Result<bool, PortalError> {
        let Some((generation, unread)) = self
            .store
            .read(|generation, snapshot| (generation, snapshot.unread_count))
        else {
            return Ok(false);
        };
        if unread == 0 {
            return Ok(false);
        }

        self.api.mark_messages_read().await?;
        if !self.store.apply(generation, SnapshotPatch::ClearUnread) {
            log::debug!("unread-clear superseded by a newer snapshot");
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal_api::mock::{MockCall, MockPortalApi};
    use crate::types::{Project, ProjectSnapshot, ProjectStatus, SenderType};

    fn snapshot_with_unread(unread: u32) -> ProjectSnapshot {
        let messages = (0..unread.max(1))
            .map(|i| Message {
                id: i as u64 + 1,
                sender_name: "Dana".to_string(),
                sender: SenderType::Admin,
                text: format!("update {}", i),
                sent_at_label: String::new(),
                unread: i < unread,
            })
            .collect();
        ProjectSnapshot {
            project: Project {
                id: 1,
                name: "Site".to_string(),
                package_tier: String::new(),
                status: ProjectStatus::Active,
                progress: 50,
                start_date: String::new(),
                estimated_end_date: String::new(),
                manager_name: String::new(),
                preview_url: None,
                preview_enabled: false,
            },
            milestones: Vec::new(),
            messages,
            files: Vec::new(),
            approvals: Vec::new(),
            unread_count: unread,
        }
    }

    async fn thread_with(
        unread: u32,
    ) -> (Arc<MockPortalApi>, Arc<SnapshotStore>, MessageThread) {
        let api = Arc::new(MockPortalApi::with_snapshot(snapshot_with_unread(unread)));
        let store = Arc::new(SnapshotStore::new(api.clone()));
        store.fetch().await;
        let thread = MessageThread::new(api.clone(), store.clone());
        (api, store, thread)
    }

    #[tokio::test]
    async fn test_send_prepends_canonical_message() {
        let (api, store, thread) = thread_with(0).await;

        let sent = thread.send("  Thanks, looks great  ").await.unwrap();
        assert_eq!(sent.text, "Thanks, looks great");
        assert_eq!(
            api.calls()[1],
            MockCall::SendMessage("Thanks, looks great".to_string())
        );

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.messages[0].id, sent.id);
        assert_eq!(snapshot.messages[0].sender, SenderType::Client);
        assert!(snapshot.unread_count_consistent());
        assert!(!thread.sending());
    }

    #[tokio::test]
    async fn test_send_empty_text_rejected_locally() {
        let (api, _store, thread) = thread_with(0).await;

        assert!(matches!(thread.send("   ").await, Err(SendError::EmptyText)));
        assert!(matches!(thread.send("").await, Err(SendError::EmptyText)));
        assert_eq!(api.call_count(|c| matches!(c, MockCall::SendMessage(_))), 0);
    }

    #[tokio::test]
    async fn test_send_failure_leaves_thread_untouched() {
        let (api, store, thread) = thread_with(0).await;
        let before = store.snapshot().unwrap().messages.len();
        api.queue_send(Err(PortalError::Api {
            status: 500,
            message: "boom".to_string(),
        }));

        assert!(matches!(
            thread.send("hello").await,
            Err(SendError::Portal(_))
        ));
        assert_eq!(store.snapshot().unwrap().messages.len(), before);
        // Compose is unblocked for the retry.
        assert!(!thread.sending());
        thread.send("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_send_rejected() {
        let (api, _store, thread) = thread_with(0).await;

        // Simulate a send still in flight.
        *thread.sending.lock() = true;
        assert!(matches!(
            thread.send("second").await,
            Err(SendError::SendInFlight)
        ));
        assert_eq!(api.call_count(|c| matches!(c, MockCall::SendMessage(_))), 0);
        *thread.sending.lock() = false;
    }

    #[tokio::test]
    async fn test_mark_read_with_unread_clears_everything() {
        let (api, store, thread) = thread_with(3).await;

        assert!(thread.mark_read_if_unread().await.unwrap());
        assert_eq!(api.call_count(|c| *c == MockCall::MarkMessagesRead), 1);

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.unread_count, 0);
        assert_eq!(snapshot.messages.len(), 3);
        assert!(snapshot.messages.iter().all(|m| !m.unread));
    }

    #[tokio::test]
    async fn test_mark_read_skipped_when_no_unread() {
        let (api, _store, thread) = thread_with(0).await;

        assert!(!thread.mark_read_if_unread().await.unwrap());
        assert_eq!(api.call_count(|c| *c == MockCall::MarkMessagesRead), 0);
    }

    #[tokio::test]
    async fn test_mark_read_failure_keeps_unread_state() {
        let (api, store, thread) = thread_with(2).await;
        api.queue_mark_read(Err(PortalError::Api {
            status: 500,
            message: "boom".to_string(),
        }));

        assert!(thread.mark_read_if_unread().await.is_err());
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.unread_count, 2);
        assert!(snapshot.unread_count_consistent());
    }
}
