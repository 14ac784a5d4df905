//! Rename Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A rename error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter the rule mode depends on is missing or blank. Surface this
    /// as a disabled action; the rename must not run.
    #[display("{mode} rule requires a non-empty {field}")]
    InvalidModeParameters { mode: &'static str, field: &'static str },
    /// Nothing is selected.
    #[display("no items selected")]
    EmptySelection,
    #[display("unknown rule mode: {_0}")]
    UnknownMode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
