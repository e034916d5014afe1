//! JSON/HTTPS implementation of the portal service contract.
//!
//! Conventions: bearer session token on every request, JSON request and
//! response bodies, 401 maps to `PortalError::NotAuthenticated` before any
//! generic status handling. File payloads travel as base64 inside JSON so
//! the transport stays plain `application/json` end to end.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use url::Url;

use super::{FileUpload, PortalApi, PortalError};
use crate::types::{Message, ProjectSnapshot};

/// Production portal client.
pub struct HttpPortalApi {
    client: reqwest::Client,
    base_url: Url,
    session_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    message: Message,
}

impl HttpPortalApi {
    /// Build a client against `base_url` with the given session token.
    pub fn new(
        base_url: &str,
        session_token: &str,
        request_timeout: std::time::Duration,
    ) -> Result<Self, PortalError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortalError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            session_token: session_token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PortalError> {
        self.base_url
            .join(path)
            .map_err(|e| PortalError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Map a non-success response into the error taxonomy. 401 is the
    /// not-authenticated signal and takes priority over everything else.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, PortalError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PortalError::NotAuthenticated);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PortalError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp)
    }

    /// POST a JSON body to a path and discard the (acknowledgment) response.
    async fn post_ack(&self, path: &str, body: &serde_json::Value) -> Result<(), PortalError> {
        let resp = self
            .client
            .post(self.endpoint(path)?)
            .bearer_auth(&self.session_token)
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn fetch_snapshot(&self) -> Result<ProjectSnapshot, PortalError> {
        let resp = self
            .client
            .get(self.endpoint("api/client/project")?)
            .bearer_auth(&self.session_token)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.json().await?)
    }

    async fn send_message(&self, text: &str) -> Result<Message, PortalError> {
        let resp = self
            .client
            .post(self.endpoint("api/client/messages")?)
            .bearer_auth(&self.session_token)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let body: SendMessageResponse = resp.json().await?;
        Ok(body.message)
    }

    async fn mark_messages_read(&self) -> Result<(), PortalError> {
        self.post_ack("api/client/messages/read", &serde_json::json!({}))
            .await
    }

    async fn upload_file(&self, upload: &FileUpload) -> Result<(), PortalError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&upload.bytes);
        self.post_ack(
            "api/client/files",
            &serde_json::json!({
                "fileName": upload.name,
                "contentBase64": encoded,
            }),
        )
        .await
    }

    async fn approve_deliverable(
        &self,
        approval_id: u64,
        note: Option<&str>,
    ) -> Result<(), PortalError> {
        self.post_ack(
            &format!("api/client/approvals/{}/approve", approval_id),
            &serde_json::json!({ "note": note }),
        )
        .await
    }

    async fn request_changes(
        &self,
        approval_id: u64,
        feedback: &str,
    ) -> Result<(), PortalError> {
        self.post_ack(
            &format!("api/client/approvals/{}/request-changes", approval_id),
            &serde_json::json!({ "feedback": feedback }),
        )
        .await
    }

    async fn log_out(&self) -> Result<(), PortalError> {
        self.post_ack("api/client/logout", &serde_json::json!({}))
            .await
    }
}
