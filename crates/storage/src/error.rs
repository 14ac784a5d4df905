//! Storage Error Types
//!
//! Every backend maps its native failures onto [`ErrorKind`], so callers can
//! decide what to do without knowing which backend they talk to.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Filesystem permissions, or credentials the bucket refused.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    #[display("file already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Connection failures and timeouts talking to a remote bucket.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// Absolute, empty, or escaping the backend root.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Anything else a backend reports, flattened to its message.
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
    /// Not an image, so hidden by [`ImageOnlyBackend`](crate::backend::ImageOnlyBackend).
    #[display("not an image path: {}", _0.display())]
    FilteredPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Transient failures: local I/O hiccups and anything remote.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Network(_) | Self::BackendError(_))
    }
}
