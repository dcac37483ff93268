//! Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The database could not be opened or accessed at all.
    #[display("storage unavailable")]
    Unavailable,
    #[display("database migration error")]
    Migration,
    /// The host refused a write for lack of space.
    #[display("storage quota exceeded")]
    QuotaExceeded,
    /// Insert collided with an existing record id. Ids are generated rather
    /// than user-supplied, so a collision indicates a caller bug.
    #[display("duplicate record id: {_0}")]
    DuplicateKey(#[error(not(source))] String),
    #[display("database error")]
    Database,
    /// Serialization/deserialization error.
    #[display("invalid record data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Classify a failed write against the `records`/`payloads` tables.
    ///
    /// SQLite reports quota exhaustion as `SQLITE_FULL` (primary result
    /// code 13, "database or disk is full").
    pub(crate) fn classify_write(id: &str, err: &sqlx::Error) -> Self {
        let Some(db) = err.as_database_error() else {
            return Self::Database;
        };
        if db.is_unique_violation() {
            Self::DuplicateKey(id.to_string())
        } else if db.code().as_deref() == Some("13") || db.message().contains("disk is full") {
            Self::QuotaExceeded
        } else {
            Self::Database
        }
    }
}
