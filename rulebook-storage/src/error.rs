//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
///
/// "No such row" is never an error here: lookups return `Option`, and
/// mutations report whether they touched anything.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization of a stored payload failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A uniqueness constraint rejected the write (duplicate key, or a
    /// second active version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other constraint rejected the write, e.g. an unknown namespace.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A stored row could not be turned back into a model value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("connection lock poisoned")]
    Poisoned,

    /// IO error (config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    Config(String),
}

impl StoreError {
    /// Classifies a failed write, turning constraint failures into
    /// [`StoreError::Conflict`] or [`StoreError::Constraint`].
    pub(crate) fn from_write(err: rusqlite::Error, what: impl FnOnce() -> String) -> Self {
        use rusqlite::ffi;

        match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
                match e.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        StoreError::Conflict(what())
                    }
                    _ => StoreError::Constraint(format!("{}: {err}", what())),
                }
            }
            _ => StoreError::Database(err),
        }
    }

    /// Whether this error is a uniqueness conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
