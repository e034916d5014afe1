//! Remote portal service contract.
//!
//! The dashboard core talks to the backend exclusively through the
//! [`PortalApi`] trait so the synchronization logic stays independent of the
//! wire protocol. `http.rs` holds the production JSON/HTTPS implementation;
//! tests script a mock against the same trait.

pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::types::{Message, ProjectSnapshot};

pub use http::HttpPortalApi;

// ============================================================================
// Error type
// ============================================================================

/// Errors from portal service operations.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Session is missing or expired. Always recovered by redirecting to the
    /// entry surface, never shown as an in-page error.
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid portal URL: {0}")]
    InvalidUrl(String),
}

impl PortalError {
    /// Whether the same request can meaningfully be retried by the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            PortalError::NotAuthenticated | PortalError::InvalidUrl(_) => false,
            PortalError::Http(_) | PortalError::Json(_) => true,
            PortalError::Api { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
        }
    }
}

// ============================================================================
// File payload
// ============================================================================

/// One file-like input handed to the upload pipeline, from a picker or a
/// drag-and-drop event.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Contract
// ============================================================================

/// Abstract contract for the remote portal service.
///
/// Every method maps to one backend operation; the exact wire format is the
/// implementation's business. Serialization of conflicting writes is the
/// dashboard core's job, not the transport's.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Fetch the full project snapshot for the signed-in client.
    async fn fetch_snapshot(&self) -> Result<ProjectSnapshot, PortalError>;

    /// Send a thread message; returns the canonical created message.
    async fn send_message(&self, text: &str) -> Result<Message, PortalError>;

    /// Mark every thread message as read.
    async fn mark_messages_read(&self) -> Result<(), PortalError>;

    /// Upload a single file.
    async fn upload_file(&self, upload: &FileUpload) -> Result<(), PortalError>;

    /// Approve a pending deliverable, with an optional note.
    async fn approve_deliverable(
        &self,
        approval_id: u64,
        note: Option<&str>,
    ) -> Result<(), PortalError>;

    /// Request changes on a pending deliverable with mandatory feedback.
    async fn request_changes(&self, approval_id: u64, feedback: &str)
        -> Result<(), PortalError>;

    /// End the portal session.
    async fn log_out(&self) -> Result<(), PortalError>;
}
