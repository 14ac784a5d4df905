//! Cache Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Every variant is a persistence failure: the in-memory
//! state stays authoritative and nothing is retried here.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The storage backend failed; the underlying storage error is attached.
    #[display("cache storage error")]
    Storage,
    /// Serialization/deserialization error, naming the offending field.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// Collection keys are plain names, not paths.
    #[display("invalid cache key: {_0}")]
    InvalidKey(#[error(not(source))] String),
    #[display("blob not found: {_0}")]
    MissingBlob(#[error(not(source))] String),
    /// Only image content is accepted into the blob store.
    #[display("unsupported blob format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
