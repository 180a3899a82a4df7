//! Lockout store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the lockout store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure
    #[error("lockout store I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Persisted state exists but cannot be understood
    #[error("lockout store {} is corrupt: {detail}", path.display())]
    Corrupt {
        /// State file
        path: PathBuf,
        /// Parse failure
        detail: String,
    },

    /// State could not be serialized
    #[error("failed to serialize lockout store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the state file itself is unreadable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
