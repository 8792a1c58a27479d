//! Submission pipeline shared by every section
//!
//! Order of effects for one submission:
//! 1. full validation (no I/O on failure)
//! 2. attachment uploads, all awaited before anything is inserted
//! 3. one bulk insert of every row
//! 4. hand-off of the pre-mapping values to the report aggregate

use crate::bridge::{SectionBridge, SectionId};
use crate::config::AuditConfig;
use crate::error::SubmissionError;
use crate::snapshot::{FormSnapshot, NextStep, RowDraft};
use audit_store::{FileRef, FileStore, FileUpload, RecordStore};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Receipt of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Unique id of this submission
    pub submission_id: Ulid,
    /// Section submitted
    pub section: SectionId,
    /// Rows inserted
    pub rows_written: usize,
    /// Attachments uploaded
    pub attachments_uploaded: usize,
    /// When the insert completed
    pub submitted_at: DateTime<Utc>,
    /// Where the user goes next
    pub next: NextStep,
}

/// Validates, uploads, inserts and hands off section snapshots
#[derive(Clone)]
pub struct SubmissionCoordinator {
    store: Arc<dyn RecordStore>,
    files: Arc<dyn FileStore>,
    bridge: Arc<dyn SectionBridge>,
    config: AuditConfig,
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SubmissionCoordinator {
    /// Coordinator over the given collaborators
    pub fn new(
        store: Arc<dyn RecordStore>,
        files: Arc<dyn FileStore>,
        bridge: Arc<dyn SectionBridge>,
        config: AuditConfig,
    ) -> Self {
        Self {
            store,
            files,
            bridge,
            config,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Re-run the validator over every row of the snapshot
    ///
    /// # Errors
    /// - `SubmissionError::ValidationFailed` with each failing field path
    pub fn validate(&self, snapshot: &FormSnapshot) -> Result<(), SubmissionError> {
        snapshot.validate().map_err(|failure| {
            debug!(
                section = %snapshot.section,
                issues = failure.issues.len(),
                "submission blocked by validation"
            );
            SubmissionError::ValidationFailed(failure)
        })
    }

    /// Upload, insert and hand off an already validated snapshot
    ///
    /// # Errors
    /// - `SubmissionError::UploadFailed` / `UploadTimedOut`: nothing inserted
    /// - `SubmissionError::StoreFailure`: insert rejected, nothing written
    pub async fn persist(&self, snapshot: FormSnapshot) -> Result<Confirmation, SubmissionError> {
        let references = self.upload_attachments(&snapshot).await?;
        let attachments_uploaded = references.iter().flatten().count();

        let rows = snapshot
            .rows
            .iter()
            .zip(&references)
            .map(|(row, file)| snapshot.store_row(row, file.as_ref()))
            .collect();

        let rows_written = self
            .store
            .insert(&snapshot.table, rows)
            .await
            .map_err(|e| {
                warn!(table = %snapshot.table, error = %e, "bulk insert failed");
                SubmissionError::StoreFailure(e)
            })?;

        self.bridge
            .merge_section(snapshot.section, snapshot.values_json());

        let confirmation = Confirmation {
            submission_id: Ulid::new(),
            section: snapshot.section,
            rows_written,
            attachments_uploaded,
            submitted_at: Utc::now(),
            next: snapshot.next,
        };
        info!(
            section = %confirmation.section,
            id = %confirmation.submission_id,
            rows_written,
            attachments_uploaded,
            "section submitted"
        );
        Ok(confirmation)
    }

    /// Validate then persist
    ///
    /// # Errors
    /// See [`SubmissionCoordinator::validate`] and [`SubmissionCoordinator::persist`]
    pub async fn submit(&self, snapshot: FormSnapshot) -> Result<Confirmation, SubmissionError> {
        self.validate(&snapshot)?;
        self.persist(snapshot).await
    }

    async fn upload_attachments(
        &self,
        snapshot: &FormSnapshot,
    ) -> Result<Vec<Option<FileRef>>, SubmissionError> {
        try_join_all(
            snapshot
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| self.upload_one(index, row)),
        )
        .await
    }

    async fn upload_one(
        &self,
        index: usize,
        row: &RowDraft,
    ) -> Result<Option<FileRef>, SubmissionError> {
        let Some(attachment) = &row.attachment else {
            return Ok(None);
        };
        let upload = FileUpload {
            file_name: attachment.file_name.clone(),
            content_type: attachment.media_type.clone(),
            bytes: attachment.bytes.clone(),
        };
        let timeout = self.config.upload_timeout();

        match tokio::time::timeout(timeout, self.files.upload(upload)).await {
            Ok(Ok(reference)) => {
                debug!(index, %reference, "attachment uploaded");
                Ok(Some(reference))
            }
            Ok(Err(source)) => {
                warn!(index, error = %source, "attachment upload failed");
                Err(SubmissionError::UploadFailed { index, source })
            }
            Err(_) => {
                warn!(index, "attachment upload timed out");
                Err(SubmissionError::UploadTimedOut {
                    index,
                    ms: self.config.upload_timeout_ms,
                })
            }
        }
    }
}
