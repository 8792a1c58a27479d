//! Store errors

/// Failures reported by a record or file store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Table does not exist
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Whether retrying the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
