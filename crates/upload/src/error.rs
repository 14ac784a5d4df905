//! Upload Error Types
//!
//! Errors here describe why a single item failed to upload. The dispatcher
//! folds them into per-item outcomes instead of aborting a group.

use derive_more::{Display, Error};

/// An upload error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for upload operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No service is configured under this name.
    #[display("unknown upload service: {_0}")]
    UnknownService(#[error(not(source))] String),
    /// The service is configured but can't be used by this build.
    #[display("upload service unavailable: {_0}")]
    Unsupported(#[error(not(source))] String),
    /// The item's blob handle is stale or its content is gone.
    #[display("no image content for {_0}")]
    MissingBlob(#[error(not(source))] String),
    /// The destination rejected the write, or reading the blob failed.
    #[display("upload storage error")]
    Storage,
    #[display("invalid service configuration: {_0}")]
    InvalidService(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
