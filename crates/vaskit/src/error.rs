//! Error types for vastool operations.
//!
//! Precondition errors (missing or non-executable binaries) are raised before
//! any process is spawned. Everything else comes from running a command and
//! classifying what it printed.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Binary is not a regular file
    NotFound,
    /// Binary exists but cannot be executed by this user
    NotExecutable,
    /// Binary ran but printed no recognizable version
    VersionNotFound,
    /// Host is joined to a different domain than requested
    DomainConflict,
    /// Requested state is not `joined` or `unjoined`
    InvalidState,
    /// Output could not be interpreted
    ParseFailure,
    /// Output was parsed and reports failing steps or issues
    StepFailure,
    /// Command exited non-zero and its output is the only explanation
    CommandFailed,
    /// Local IO failure (spawning a process, reading a file)
    Io,
}

impl ErrorKind {
    /// Whether this kind is detected before any process is spawned.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::NotExecutable | Self::DomainConflict | Self::InvalidState
        )
    }
}

/// Errors that can occur while driving vastool and friends.
#[derive(Debug, Error)]
pub enum Error {
    /// Binary not found
    #[error("{} was not found", .0.display())]
    NotFound(PathBuf),

    /// Binary not executable
    #[error("Insufficient permissions to execute {}", .0.display())]
    NotExecutable(PathBuf),

    /// No version in the binary's banner
    #[error("Could not get version of {}", .0.display())]
    VersionNotFound(PathBuf),

    /// Already joined elsewhere
    #[error("Cannot join domain {requested} because already joined to domain {current}")]
    DomainConflict {
        /// Domain the caller asked for
        requested: String,
        /// Domain the host is joined to
        current: String,
    },

    /// Unknown requested state
    #[error("Unexpected state requested: {0}")]
    InvalidState(String),

    /// Unparseable output
    #[error("{0}")]
    ParseFailure(String),

    /// One or more steps failed; message lists them one per line
    #[error("{0}")]
    StepFailure(String),

    /// Non-zero exit, raw output attached
    #[error("{0}")]
    CommandFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Identity data error
    #[error(transparent)]
    Identity(#[from] idmap::Error),
}

impl Error {
    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotExecutable(_) => ErrorKind::NotExecutable,
            Error::VersionNotFound(_) => ErrorKind::VersionNotFound,
            Error::DomainConflict { .. } => ErrorKind::DomainConflict,
            Error::InvalidState(_) => ErrorKind::InvalidState,
            Error::ParseFailure(_) => ErrorKind::ParseFailure,
            Error::StepFailure(_) => ErrorKind::StepFailure,
            Error::CommandFailed(_) => ErrorKind::CommandFailed,
            Error::Io(_) | Error::Identity(_) => ErrorKind::Io,
        }
    }
}

/// Result type for vastool operations.
pub type Result<T> = std::result::Result<T, Error>;
