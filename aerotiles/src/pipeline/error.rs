//! Pipeline-level errors.

use thiserror::Error;

use crate::archive::ArchiveError;

/// Failures that end a region's run.
///
/// Individual tile failures are not errors; they are counted in the
/// [`Summary`](super::Summary).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The region cannot be enumerated.
    #[error("Invalid region '{region}': {reason}")]
    InvalidRegion { region: String, reason: String },

    /// The region exceeds the configured tile ceiling.
    #[error("Region '{region}' has {count} tiles, limit is {limit}")]
    TooManyTiles {
        region: String,
        count: u64,
        limit: u64,
    },

    /// The archive could not be written; it has been removed.
    #[error("Archive storage failed: {0}")]
    Storage(#[from] ArchiveError),

    /// Too many tiles failed and abort-on-failure is set.
    #[error("Region '{region}' aborted: {failed} of {attempted} tiles failed")]
    Aborted {
        region: String,
        failed: u64,
        attempted: u64,
    },

    /// The run was cancelled externally.
    #[error("Region '{region}' cancelled")]
    Cancelled { region: String },

    /// A pipeline task panicked or was aborted.
    #[error("Pipeline task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        PipelineError::Join(e.to_string())
    }
}
