//! Board Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A board error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An item with the same id is already on the board.
    #[display("duplicate item: {_0}")]
    DuplicateItem(#[error(not(source))] String),
    /// No item with this id exists on the board.
    #[display("unknown item: {_0}")]
    UnknownItem(#[error(not(source))] String),
    /// A position outside of `0..len` was requested.
    #[display("index {index} out of range for board of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::DuplicateItem("a".to_string()).to_string(), "duplicate item: a");
        assert_eq!(
            ErrorKind::IndexOutOfRange { index: 4, len: 2 }.to_string(),
            "index 4 out of range for board of length 2"
        );
    }
}
