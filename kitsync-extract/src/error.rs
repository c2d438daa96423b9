//! Error types for kitsync-extract.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading a sheet export. Extraction itself never fails: blocks
/// it cannot use are reported as diagnostics instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tab-delimited export could not be tokenized.
    #[error("malformed sheet export: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience constructor for [`ExtractError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ExtractError {
    ExtractError::Io {
        path: path.into(),
        source,
    }
}
