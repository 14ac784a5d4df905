//! Application Error Types
//!
//! Library errors are wrapped with the layer they came from; the full tree is
//! printed when a command fails.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("storage error")]
    Storage,
    #[display("cache error")]
    Cache,
    #[display("board error")]
    Board,
    #[display("rename error")]
    Rename,
    #[display("cannot import {}: {_1}", _0.display())]
    Import(#[error(not(source))] PathBuf, #[error(not(source))] String),
    #[display("{_0} is listed more than once")]
    DuplicateSelection(#[error(not(source))] String),
    #[display("derived group {_0} already exists")]
    DuplicateGroup(#[error(not(source))] String),
    #[display("no derived group named {_0}")]
    UnknownGroup(#[error(not(source))] String),
    #[display("upload of {_0} finished with status {_1}")]
    UploadIncomplete(#[error(not(source))] String, #[error(not(source))] String),
    #[display("failed to write output")]
    Output,
}
