//! Error types for the journal core.

use thiserror::Error;

/// Journal error type.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Referenced entity does not exist or lives in another account.
    #[error("{entity} not found")]
    NotFound {
        /// Kind of entity that failed to resolve.
        entity: &'static str,
    },
    /// Malformed explicit date.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// Cross-account or cross-contact reference detected after lookup.
    #[error("ownership mismatch: {0}")]
    OwnershipMismatch(String),
    /// Message content failed validation.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`JournalError`] for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or foreign id.
    NotFound,
    /// Malformed explicit date.
    InvalidDate,
    /// Cross-tenant reference.
    OwnershipMismatch,
    /// Rejected message batch.
    InvalidMessage,
    /// Bad configuration.
    InvalidConfig,
    /// Storage fault; any batch in flight was rolled back.
    PersistenceFailure,
}

impl JournalError {
    /// Shorthand for [`JournalError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidDate(_) => ErrorKind::InvalidDate,
            Self::OwnershipMismatch(_) => ErrorKind::OwnershipMismatch,
            Self::InvalidMessage(_) => ErrorKind::InvalidMessage,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Sqlite(_) | Self::TokioSqlite(_) | Self::Io(_) => ErrorKind::PersistenceFailure,
        }
    }
}

/// Convenience result alias for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
