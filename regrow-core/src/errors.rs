use regrow_hal::HalError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to map a device entry onto `(disk, partition)`. Always degrades to SKIPPED.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("unable to convert to device: {reason}")]
    Unresolvable { entry: String, reason: String },

    #[error("stat of '{}' failed: {source}", path.display())]
    StatFailed { path: PathBuf, source: HalError },

    #[error("device '{}' not a block device", path.display())]
    NotABlockDevice { path: PathBuf },

    #[error("partition lookup for {} failed: {reason}", path.display())]
    NotAPartition { path: PathBuf, reason: String },

    #[error("partition lookup for {} failed: {reason}", path.display())]
    Topology { path: PathBuf, reason: String },
}

/// Failure inside a resize backend. Always degrades to FAILED.
#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("unable to read size of {}: {source}", path.display())]
    Size { path: PathBuf, source: HalError },

    #[error("unable to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("{command} failed: {source}")]
    Command { command: String, source: HalError },

    #[error("partition shrank from {before} to {after} bytes")]
    Shrunk { before: u64, after: u64 },
}

/// Backend selection failure. Fatal for the whole run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("unknown resize mode {0}")]
    UnknownMode(String),

    #[error("no resizers available")]
    NoBackendAvailable,

    #[error("mode {0} not available")]
    ModeUnavailable(String),
}

impl SelectError {
    /// Both "nothing found in auto mode" and "named backend missing" mean no backend.
    pub fn is_no_backend(&self) -> bool {
        matches!(
            self,
            SelectError::NoBackendAvailable | SelectError::ModeUnavailable(_)
        )
    }
}
