#![allow(clippy::result_large_err)]

//! Batch file uploads against an entity's file sub-resource.
//!
//! Uploads run one file at a time. An [`UploadCanceller`] aborts the file in
//! flight and skips the rest; files already uploaded stay uploaded.

use crate::api::{entity_id, EntityApi, FileEntry, Resource};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::wizard::{DatasetCreateFlow, Wizard};
use futures::future::{AbortHandle, Abortable};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Cloneable handle that aborts a running [`upload_all`].
#[derive(Clone, Default)]
pub struct UploadCanceller {
    cancelled: Arc<AtomicBool>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
}

impl UploadCanceller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.in_flight.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.abort();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn arm(&self, handle: AbortHandle) {
        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = Some(handle);
        }
    }

    fn disarm(&self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = None;
        }
    }
}

#[derive(Debug)]
pub struct UploadFailure {
    pub path: PathBuf,
    pub error: AppError,
}

/// Per-file result of a batch upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<FileEntry>,
    pub failed: Vec<UploadFailure>,
    /// Files never attempted because the batch was cancelled.
    pub skipped: Vec<PathBuf>,
    pub cancelled: bool,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && !self.cancelled
    }

    /// Paths worth retrying: failures first, then skipped files.
    pub fn retryable_paths(&self) -> Vec<PathBuf> {
        self.failed
            .iter()
            .map(|failure| failure.path.clone())
            .chain(self.skipped.iter().cloned())
            .collect()
    }
}

/// Upload `files` to the entity's file collection, continuing past
/// individual failures.
pub async fn upload_all(
    api: &dyn EntityApi,
    resource: Resource,
    id: &str,
    files: &[PathBuf],
    canceller: &UploadCanceller,
) -> UploadReport {
    let mut report = UploadReport::default();

    for (idx, path) in files.iter().enumerate() {
        if canceller.is_cancelled() {
            report.cancelled = true;
            report.skipped.extend(files[idx..].iter().cloned());
            break;
        }

        let (handle, registration) = AbortHandle::new_pair();
        canceller.arm(handle.clone());
        if canceller.is_cancelled() {
            handle.abort();
        }

        let outcome = Abortable::new(api.upload_file(resource, id, path), registration).await;
        canceller.disarm();

        match outcome {
            Ok(Ok(entry)) => report.uploaded.push(entry),
            Ok(Err(error)) => {
                tracing::warn!("Upload of {} failed: {}", path.display(), error.message);
                report.failed.push(UploadFailure {
                    path: path.clone(),
                    error,
                });
            }
            Err(_aborted) => {
                tracing::info!("Upload of {} aborted", path.display());
                report.cancelled = true;
                report.failed.push(UploadFailure {
                    path: path.clone(),
                    error: AppError::new(ErrorCategory::Cancelled, "upload aborted")
                        .with_code("UPLOAD_ABORTED"),
                });
                report.skipped.extend(files[idx + 1..].iter().cloned());
                break;
            }
        }
    }

    tracing::info!(
        "Uploaded {}/{} files to {} {}",
        report.uploaded.len(),
        files.len(),
        resource,
        id
    );
    report
}

/// Result of creating a dataset and then uploading its local files.
#[derive(Debug)]
pub struct DatasetCreateOutcome {
    pub dataset: Value,
    pub dataset_id: String,
    pub uploads: UploadReport,
}

impl DatasetCreateOutcome {
    pub fn is_complete(&self) -> bool {
        self.uploads.is_complete()
    }
}

/// Submit the dataset wizard, then upload its pending files to the new
/// dataset.
///
/// A failed create leaves the wizard editable and returns the error. Once the
/// dataset exists it is never rolled back: upload failures are reported in
/// the outcome so the caller can retry them against `dataset_id`.
pub async fn create_dataset_with_uploads(
    wizard: &mut Wizard<DatasetCreateFlow>,
    api: &dyn EntityApi,
    canceller: &UploadCanceller,
) -> Result<DatasetCreateOutcome, AppError> {
    let files = wizard.flow().pending_uploads().to_vec();
    let dataset = wizard.submit(api).await?;

    let dataset_id = match entity_id(&dataset) {
        Some(id) => id,
        None if files.is_empty() => String::new(),
        None => {
            return Err(AppError::new(
                ErrorCategory::CollaboratorError,
                "dataset was created but the response carried no id; files were not uploaded",
            )
            .with_code("MISSING_ENTITY_ID")
            .with_context("pending_files", files.len().to_string())
            .with_suggestion("Look up the new dataset and upload the files to it directly"));
        }
    };

    let uploads = if files.is_empty() {
        UploadReport::default()
    } else {
        upload_all(api, Resource::Datasets, &dataset_id, &files, canceller).await
    };

    Ok(DatasetCreateOutcome {
        dataset,
        dataset_id,
        uploads,
    })
}
