//! Error types for kitsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, so `~/.kitsync/` cannot be located.
    #[error("cannot determine home directory; set $HOME or pass --home")]
    HomeNotFound,

    /// A layout that would make extraction ambiguous (e.g. two roles on one column).
    #[error("invalid sheet layout: {0}")]
    InvalidLayout(String),
}
