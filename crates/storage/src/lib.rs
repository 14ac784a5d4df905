//! Storage backends for image blobs and cached collections.
//!
//! Every backend implements [`StorageBackend`], an async CRUD interface over
//! paths relative to the backend's root. Decorators ([`ReadOnlyBackend`],
//! [`ImageOnlyBackend`]) wrap any other backend.
//!
//! [`ReadOnlyBackend`]: crate::backend::ReadOnlyBackend
//! [`ImageOnlyBackend`]: crate::backend::ImageOnlyBackend

pub mod backend;
pub mod error;
pub mod file;
mod format;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::format::ImageFormat;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
