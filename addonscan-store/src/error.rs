//! Store error types.

use std::path::PathBuf;

use addonscan_core::CoreError;
use thiserror::Error;

/// Errors that can occur while reading or writing run files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path does not have the required extension.
    #[error("{path} must lead to a json file")]
    NotJson {
        /// The offending path.
        path: PathBuf,
    },

    /// The output path is taken.
    #[error("Output path already exists: {0}")]
    OutputExists(PathBuf),

    /// The configuration loaded but does not validate.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error is about the arguments rather than the
    /// filesystem.
    pub fn is_usage(&self) -> bool {
        matches!(self, StoreError::NotJson { .. } | StoreError::OutputExists(_))
    }
}
