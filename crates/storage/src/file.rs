//! Metadata about stored files, as returned by listing and `stat` calls.

use crate::ImageFormat;
use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Image format detected from the file extension, if any
    pub format: Option<ImageFormat>,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        let format = ImageFormat::from_path(&path);
        Self { path, size, modified, format }
    }

    pub fn is_image(&self) -> bool {
        self.format.is_some()
    }
}
