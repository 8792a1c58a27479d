//! Cascade errors

use audit_store::StoreError;

/// An options fetch did not produce a list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Backing store failed
    #[error("options unavailable: {0}")]
    Store(#[from] StoreError),

    /// No response within the configured timeout
    #[error("options fetch timed out after {ms}ms")]
    TimedOut {
        /// Timeout that elapsed
        ms: u64,
    },

    /// Provider-specific failure
    #[error("options provider failed: {0}")]
    Provider(String),
}

/// Misuse of the chain itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// Chain declared with no levels
    #[error("cascade chain has no levels")]
    Empty,

    /// Two levels share a key
    #[error("duplicate level key: {0}")]
    DuplicateLevel(String),

    /// Level index out of range
    #[error("unknown level {0}")]
    UnknownLevel(usize),

    /// Level key not in the chain
    #[error("unknown level key: {0}")]
    UnknownKey(String),

    /// The root level is only fetched once
    #[error("cascade chain already started")]
    AlreadyStarted,

    /// An ancestor has no committed value
    #[error("level {level} cannot be fetched until every ancestor is selected")]
    NotFetchable {
        /// Level that was requested
        level: usize,
    },

    /// Value is not among the level's current options
    #[error("'{value}' is not an option for level {level}")]
    NotAnOption {
        /// Level being committed
        level: usize,
        /// Rejected value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert() {
        let err: FetchError = StoreError::Unavailable("down".into()).into();
        assert_eq!(err.to_string(), "options unavailable: store unavailable: down");
    }
}
