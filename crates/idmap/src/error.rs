//! Error types for identity parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading identity data.
#[derive(Debug, Error)]
pub enum Error {
    /// Input document is not the expected shape
    #[error("invalid identity data at entry {index}: {message}")]
    Parse {
        /// Zero-based index of the offending entry
        index: usize,
        /// What was wrong with it
        message: String,
    },

    /// Account file could not be read
    #[error("could not read {}: {source}", .path.display())]
    Read {
        /// File that failed to read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, Error>;
