//! Record list errors

use crate::attachment::AttachmentRejected;
use audit_schema::SchemaError;

/// Failures of record list operations; the list is unchanged on error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// No record at the index
    #[error("no record at index {index} (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current length
        len: usize,
    },

    /// Removal would take the list below its minimum length
    #[error("cannot remove: list must keep at least {min} record(s)")]
    BelowMinimum {
        /// Configured minimum
        min: usize,
    },

    /// Field key not in the record schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Attachment refused by the policy
    #[error("attachment rejected: {0}")]
    Attachment(#[from] AttachmentRejected),
}
