//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during version history operations.
///
/// Every variant is surfaced synchronously to the caller; a failed
/// filesystem operation is reported, never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No repository directory at the working-tree root.
    #[error("No repository found")]
    RepositoryMissing,

    /// The version log does not exist or holds no versions of the file.
    #[error("No history found")]
    HistoryMissing,

    /// The working file does not exist.
    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    /// Version outside `[1, latest]` or without a log record.
    #[error("Invalid version {version} for {filename}: available versions 1 to {latest}")]
    InvalidVersion {
        filename: String,
        version: u32,
        latest: u32,
    },

    /// The file is not registered in the tracking index.
    #[error("File is not tracked: {0}")]
    NotTracked(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error reading diff input.
    #[error(transparent)]
    Diff(#[from] snapvc_diff::DiffError),
}
