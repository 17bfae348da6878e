//! Error types for record validation, query building and storage.

use thiserror::Error;

/// Errors that can occur while validating, querying or persisting log records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// A required field was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The record timestamp is absent, unparsable, or the zero instant.
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// The record names a different tenant than the authenticated caller.
    #[error("tenant mismatch: record tenant does not match authenticated tenant")]
    TenantMismatch,

    /// A `start_time` or `end_time` query bound is not an RFC 3339 instant.
    #[error("invalid time bound: {0}")]
    InvalidTimeBound(&'static str),

    /// The persistence backend failed to execute an insert or select.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored row could not be turned into a log record.
    #[error("row decode error: {0}")]
    RowDecode(String),
}

impl LogError {
    /// Returns true for errors caused by the caller's input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidTimestamp
                | Self::TenantMismatch
                | Self::InvalidTimeBound(_)
        )
    }
}

impl From<rusqlite::Error> for LogError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
