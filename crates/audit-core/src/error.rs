//! Error types for the report sections
//!
//! Every failure a section can surface, grouped by who can fix it:
//! - the user, by editing fields or attachments
//! - a retry, after a transient store or provider failure
//! - nobody at runtime (misconfiguration, misuse of the API)

use crate::config::ConfigError;
use crate::phase::PhaseError;
use audit_cascade::{ChainError, FetchError};
use audit_records::{AttachmentRejected, RecordError};
use audit_schema::{FieldIssue, SchemaError};
use audit_store::StoreError;
use serde::Serialize;
use std::fmt;

/// Validation state of one submitted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// Every field passed
    Valid,
    /// Keys of the failing fields, in schema order
    Invalid {
        /// Failing keys
        fields: Vec<String>,
    },
}

impl RowStatus {
    /// Whether the row passed
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Outcome of a failed full validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Every failing field, addressed by full key path
    pub issues: Vec<FieldIssue>,
    /// Per-row verdicts, in submission order
    pub rows: Vec<RowStatus>,
}

impl ValidationFailure {
    /// Indices of the rows that failed
    #[must_use]
    pub fn invalid_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_valid())
            .map(|(i, _)| i)
            .collect()
    }

    /// Issues belonging to one row of a list section
    pub fn issues_for(&self, row: usize) -> impl Iterator<Item = &FieldIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.path.record_index() == Some(row))
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.issues.len())?;
        if self.rows.len() > 1 {
            write!(f, " in record(s) {:?}", self.invalid_rows())?;
        }
        Ok(())
    }
}

/// Submission failures
///
/// The section's form state is unchanged whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// Full validation found invalid fields; nothing was written
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationFailure),

    /// An attachment upload failed; nothing was inserted
    #[error("attachment upload failed for record {index}: {source}")]
    UploadFailed {
        /// Row whose attachment failed
        index: usize,
        /// Store failure
        source: StoreError,
    },

    /// An attachment upload did not finish in time; nothing was inserted
    #[error("attachment upload for record {index} timed out after {ms}ms")]
    UploadTimedOut {
        /// Row whose attachment timed out
        index: usize,
        /// Timeout that elapsed
        ms: u64,
    },

    /// The bulk insert failed; nothing was written
    #[error("store failure: {0}")]
    StoreFailure(StoreError),

    /// The section already succeeded and accepts no more edits
    #[error("section already submitted")]
    SectionClosed,

    /// Internal phase bookkeeping went wrong
    #[error(transparent)]
    Phase(#[from] PhaseError),
}

impl SubmissionError {
    /// Whether resubmitting the same content may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UploadFailed { source, .. } | Self::StoreFailure(source) => {
                source.is_retryable()
            }
            Self::UploadTimedOut { .. } => true,
            Self::ValidationFailed(_) | Self::SectionClosed | Self::Phase(_) => false,
        }
    }

    /// Validation detail, if that is why the submission stopped
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::ValidationFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Umbrella error for section operations
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A single field is invalid
    #[error("invalid field {0}")]
    FieldInvalid(FieldIssue),

    /// The key belongs to a cascade level and must go through `select`
    #[error("field '{0}' is a cascade selection")]
    CascadeField(String),

    /// Cascade options could not be loaded
    #[error("options fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Cascade misuse
    #[error("cascade error: {0}")]
    Chain(#[from] ChainError),

    /// Record list misuse or rejected attachment
    #[error("record error: {0}")]
    Records(#[from] RecordError),

    /// Unknown field key or malformed schema
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Submission failed
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FormError {
    /// Whether repeating the same operation may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(FetchError::Store(e)) => e.is_retryable(),
            Self::Fetch(FetchError::TimedOut { .. }) => true,
            Self::Submission(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether the user can resolve this by changing their input
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            Self::FieldInvalid(_)
                | Self::Submission(SubmissionError::ValidationFailed(_))
                | Self::Records(
                    RecordError::Attachment(_) | RecordError::BelowMinimum { .. }
                )
                | Self::Chain(ChainError::NotAnOption { .. } | ChainError::NotFetchable { .. })
        )
    }

    /// Rejected attachment, if that is the cause
    #[must_use]
    pub fn attachment_rejection(&self) -> Option<&AttachmentRejected> {
        match self {
            Self::Records(RecordError::Attachment(rejected)) => Some(rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_schema::FieldPath;

    fn issue(path: &str) -> FieldIssue {
        FieldIssue {
            path: path.parse().unwrap_or_else(|_| FieldPath::root(path)),
            label: "Valor".into(),
            reason: "Valor es requerido".into(),
        }
    }

    #[test]
    fn retryable_classification() {
        let unavailable = StoreError::Unavailable("down".into());
        assert!(SubmissionError::StoreFailure(unavailable.clone()).is_retryable());
        assert!(SubmissionError::UploadFailed {
            index: 0,
            source: unavailable
        }
        .is_retryable());
        assert!(!SubmissionError::StoreFailure(StoreError::Rejected("bad column".into()))
            .is_retryable());
        assert!(!SubmissionError::SectionClosed.is_retryable());
        assert!(FormError::from(FetchError::TimedOut { ms: 10 }).is_retryable());
    }

    #[test]
    fn user_fixable_classification() {
        let failure = ValidationFailure {
            issues: vec![issue("opportunities[1].estimatedSavings.value")],
            rows: vec![RowStatus::Valid, RowStatus::Invalid { fields: vec!["estimatedSavings.value".into()] }],
        };
        assert!(FormError::from(SubmissionError::ValidationFailed(failure)).is_user_fixable());
        assert!(FormError::from(RecordError::Attachment(AttachmentRejected::Empty)).is_user_fixable());
        assert!(!FormError::from(FetchError::Provider("boom".into())).is_user_fixable());
    }

    #[test]
    fn failure_groups_issues_by_row() {
        let failure = ValidationFailure {
            issues: vec![
                issue("opportunities[1].measureType"),
                issue("opportunities[1].estimatedSavings.value"),
            ],
            rows: vec![
                RowStatus::Valid,
                RowStatus::Invalid {
                    fields: vec!["measureType".into(), "estimatedSavings.value".into()],
                },
                RowStatus::Valid,
            ],
        };
        assert_eq!(failure.invalid_rows(), vec![1]);
        assert_eq!(failure.issues_for(1).count(), 2);
        assert_eq!(failure.issues_for(0).count(), 0);
        assert_eq!(failure.to_string(), "2 invalid field(s) in record(s) [1]");
    }
}
