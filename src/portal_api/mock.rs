//! Scripted in-memory portal service for unit tests.
//!
//! Records every call and replays programmed outcomes in order. Operations
//! with no programmed outcome succeed: acks return `Ok(())` and fetches
//! return the configured baseline snapshot.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FileUpload, PortalApi, PortalError};
use crate::types::{Message, ProjectSnapshot, SenderType};

/// One recorded call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    FetchSnapshot,
    SendMessage(String),
    MarkMessagesRead,
    UploadFile(String),
    Approve { id: u64, note: Option<String> },
    RequestChanges { id: u64, feedback: String },
    LogOut,
}

#[derive(Default)]
pub struct MockPortalApi {
    baseline: Mutex<Option<ProjectSnapshot>>,
    fetch_queue: Mutex<VecDeque<Result<ProjectSnapshot, PortalError>>>,
    send_queue: Mutex<VecDeque<Result<Message, PortalError>>>,
    ack_queues: Mutex<AckQueues>,
    calls: Mutex<Vec<MockCall>>,
}

#[derive(Default)]
struct AckQueues {
    mark_read: VecDeque<Result<(), PortalError>>,
    upload: VecDeque<Result<(), PortalError>>,
    approve: VecDeque<Result<(), PortalError>>,
    request_changes: VecDeque<Result<(), PortalError>>,
    log_out: VecDeque<Result<(), PortalError>>,
}

fn service_down() -> PortalError {
    PortalError::Api {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

impl MockPortalApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `snapshot` as the result of every fetch not otherwise scripted.
    pub fn with_snapshot(snapshot: ProjectSnapshot) -> Self {
        let api = Self::default();
        *api.baseline.lock() = Some(snapshot);
        api
    }

    pub fn set_baseline(&self, snapshot: ProjectSnapshot) {
        *self.baseline.lock() = Some(snapshot);
    }

    pub fn queue_fetch(&self, result: Result<ProjectSnapshot, PortalError>) {
        self.fetch_queue.lock().push_back(result);
    }

    pub fn queue_send(&self, result: Result<Message, PortalError>) {
        self.send_queue.lock().push_back(result);
    }

    pub fn queue_mark_read(&self, result: Result<(), PortalError>) {
        self.ack_queues.lock().mark_read.push_back(result);
    }

    pub fn queue_upload(&self, result: Result<(), PortalError>) {
        self.ack_queues.lock().upload.push_back(result);
    }

    pub fn queue_approve(&self, result: Result<(), PortalError>) {
        self.ack_queues.lock().approve.push_back(result);
    }

    pub fn queue_request_changes(&self, result: Result<(), PortalError>) {
        self.ack_queues.lock().request_changes.push_back(result);
    }

    pub fn queue_log_out(&self, result: Result<(), PortalError>) {
        self.ack_queues.lock().log_out.push_back(result);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, matches: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    /// Canonical created message for unscripted sends.
    fn default_sent_message(text: &str) -> Message {
        Message {
            id: 9_000,
            sender_name: "You".to_string(),
            sender: SenderType::Client,
            text: text.to_string(),
            sent_at_label: "Just now".to_string(),
            unread: false,
        }
    }
}

#[async_trait]
impl PortalApi for MockPortalApi {
    async fn fetch_snapshot(&self) -> Result<ProjectSnapshot, PortalError> {
        self.record(MockCall::FetchSnapshot);
        if let Some(result) = self.fetch_queue.lock().pop_front() {
            return result;
        }
        self.baseline.lock().clone().ok_or_else(service_down)
    }

    async fn send_message(&self, text: &str) -> Result<Message, PortalError> {
        self.record(MockCall::SendMessage(text.to_string()));
        match self.send_queue.lock().pop_front() {
            Some(result) => result,
            None => Ok(Self::default_sent_message(text)),
        }
    }

    async fn mark_messages_read(&self) -> Result<(), PortalError> {
        self.record(MockCall::MarkMessagesRead);
        self.ack_queues.lock().mark_read.pop_front().unwrap_or(Ok(()))
    }

    async fn upload_file(&self, upload: &FileUpload) -> Result<(), PortalError> {
        self.record(MockCall::UploadFile(upload.name.clone()));
        self.ack_queues.lock().upload.pop_front().unwrap_or(Ok(()))
    }

    async fn approve_deliverable(
        &self,
        approval_id: u64,
        note: Option<&str>,
    ) -> Result<(), PortalError> {
        self.record(MockCall::Approve {
            id: approval_id,
            note: note.map(str::to_string),
        });
        self.ack_queues.lock().approve.pop_front().unwrap_or(Ok(()))
    }

    async fn request_changes(
        &self,
        approval_id: u64,
        feedback: &str,
    ) -> Result<(), PortalError> {
        self.record(MockCall::RequestChanges {
            id: approval_id,
            feedback: feedback.to_string(),
        });
        self.ack_queues
            .lock()
            .request_changes
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn log_out(&self) -> Result<(), PortalError> {
        self.record(MockCall::LogOut);
        self.ack_queues.lock().log_out.pop_front().unwrap_or(Ok(()))
    }
}
