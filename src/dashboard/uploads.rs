//! File upload pipeline.
//!
//! Uploads a batch strictly sequentially: file N+1 is not issued until
//! file N's request settles. Progress is driven purely by the success
//! count; a failed file is recorded and skipped without aborting the rest
//! of the batch. When the batch settles the pipeline resets and asks the
//! snapshot store for exactly one refetch, which is how the newly created
//! file assets become visible.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::store::{FetchOutcome, SnapshotStore};
use crate::portal_api::{FileUpload, PortalApi, PortalError};

/// Errors raised before any upload is issued.
#[derive(Debug, thiserror::Error)]
pub enum UploadBatchError {
    #[error("No files to upload")]
    EmptyBatch,
    #[error("An upload batch is already in flight")]
    UploadInFlight,
}

/// One file that did not make it.
#[derive(Debug)]
pub struct UploadFailure {
    pub name: String,
    pub error: PortalError,
}

/// Fold accumulator for one batch. `progress_steps` records the percentage
/// after each successful file, so the success-count-driven progress rule is
/// testable in isolation.
#[derive(Debug)]
pub struct UploadReport {
    pub total: usize,
    pub uploaded: usize,
    pub failures: Vec<UploadFailure>,
    pub progress_steps: Vec<u8>,
}

impl UploadReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            uploaded: 0,
            failures: Vec::new(),
            progress_steps: Vec::new(),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress percentage after `uploaded` of `total` files have succeeded.
pub fn progress_percent(uploaded: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((uploaded as f64 / total as f64) * 100.0).round() as u8
}

#[derive(Default)]
struct PipelineState {
    uploading: bool,
    progress: u8,
    drag_active: bool,
}

pub struct UploadPipeline {
    api: Arc<dyn PortalApi>,
    store: Arc<SnapshotStore>,
    state: Mutex<PipelineState>,
}

impl UploadPipeline {
    pub fn new(api: Arc<dyn PortalApi>, store: Arc<SnapshotStore>) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(PipelineState::default()),
        }
    }

    pub fn uploading(&self) -> bool {
        self.state.lock().uploading
    }

    /// Aggregate progress of the in-flight batch, 0 when idle.
    pub fn progress(&self) -> u8 {
        self.state.lock().progress
    }

    /// Visual-affordance flag for the drop target. Carries no other state.
    pub fn set_drag_active(&self, active: bool) {
        self.state.lock().drag_active = active;
    }

    pub fn drag_active(&self) -> bool {
        self.state.lock().drag_active
    }

    /// Upload a batch of files sequentially and refetch the snapshot once
    /// the whole batch has settled, success or partial failure.
    pub async fn upload_batch(
        &self,
        files: Vec<FileUpload>,
    ) -> Result<UploadReport, UploadBatchError> {
        if files.is_empty() {
            return Err(UploadBatchError::EmptyBatch);
        }
        {
            let mut state = self.state.lock();
            if state.uploading {
                return Err(UploadBatchError::UploadInFlight);
            }
            state.uploading = true;
            state.progress = 0;
        }

        let batch_id = Uuid::new_v4();
        log::info!("upload batch {}: {} file(s)", batch_id, files.len());

        let mut report = UploadReport::new(files.len());
        for file in &files {
            match self.api.upload_file(file).await {
                Ok(()) => {
                    report.uploaded += 1;
                    let percent = progress_percent(report.uploaded, report.total);
                    report.progress_steps.push(percent);
                    self.state.lock().progress = percent;
                }
                Err(e) => {
                    log::warn!("upload batch {}: {} failed: {}", batch_id, file.name, e);
                    report.failures.push(UploadFailure {
                        name: file.name.clone(),
                        error: e,
                    });
                }
            }
        }

        {
            let mut state = self.state.lock();
            state.progress = 0;
            state.uploading = false;
        }
        log::info!(
            "upload batch {}: {}/{} uploaded",
            batch_id,
            report.uploaded,
            report.total
        );

        // One refetch per batch, not one per file.
        if self.store.fetch().await != FetchOutcome::Ready {
            log::warn!("refetch after upload batch {} did not land", batch_id);
        }

        Ok(report)
    }
}
