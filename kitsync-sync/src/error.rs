//! Error types for kitsync-sync.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised at the persistence boundary.
///
/// [`StoreError::Conflict`] and [`StoreError::NotFound`] concern a single
/// record and are recoverable inside a sync; every other variant is an
/// infrastructure fault that aborts the whole transaction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A constraint or uniqueness violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted record no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Backend(#[source] rusqlite::Error),

    /// The database is locked by another writer past the busy timeout, or
    /// could not be opened.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted row could not be decoded.
    #[error("corrupt row in {table}: {message}")]
    Corrupt {
        table: &'static str,
        message: String,
    },

    /// JSON encoding of a list column failed.
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// `true` when the failure is confined to one record.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Conflict(_) | StoreError::NotFound(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, detail) = &err {
            match code.code {
                ErrorCode::ConstraintViolation => {
                    return StoreError::Conflict(
                        detail.clone().unwrap_or_else(|| err.to_string()),
                    );
                }
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen => {
                    return StoreError::Unavailable(err.to_string());
                }
                _ => {}
            }
        }
        if matches!(err, rusqlite::Error::QueryReturnedNoRows) {
            return StoreError::NotFound(err.to_string());
        }
        StoreError::Backend(err)
    }
}

/// Errors that abort a sync. Nothing was committed when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An infrastructure fault; the transaction was rolled back.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The sheet produced no kits; syncing it would delete every kit.
    #[error("no valid kits found in sheet")]
    NoKitsFound,
}

impl SyncError {
    /// `true` for uniqueness/constraint problems a caller may show verbatim.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Store(StoreError::Conflict(_)))
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
