//! Image-filtered storage decorator.
//!
//! Wraps another backend and restricts every operation to paths whose
//! extension is a recognised [`ImageFormat`].

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{BackendHandle, ImageFormat, StorageBackend, error::Result, file::FileInfo};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;

fn ensure_image(path: &Path) -> Result<()> {
    if ImageFormat::from_path(path).is_none() {
        exn::bail!(ErrorKind::FilteredPath(path.to_path_buf()));
    }
    Ok(())
}

/// Image-filtered storage backend.
///
/// Listing silently skips non-image files; every other operation on a
/// non-image path fails with [`FilteredPath`](ErrorKind::FilteredPath).
#[derive(Clone)]
pub struct ImageOnlyBackend {
    inner: BackendHandle,
}
impl ImageOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ImageOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        Box::pin(self.inner.list_stream(prefix).filter(|item| {
            std::future::ready(match item {
                Ok(info) => info.is_image(),
                Err(_) => true,
            })
        }))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        ensure_image(path)?;
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        ensure_image(path)?;
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        ensure_image(path)?;
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        ensure_image(path)?;
        self.inner.delete(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_image(from)?;
        ensure_image(to)?;
        self.inner.rename(from, to).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        ensure_image(path)?;
        self.inner.stat(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use rstest::rstest;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn setup() -> (tempfile::TempDir, ImageOnlyBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let local = LocalBackend::new("test", temp_dir.path()).unwrap();
        (temp_dir, ImageOnlyBackend::new(Arc::new(local)))
    }

    #[rstest]
    #[case("cover.png", true)]
    #[case("SKU1/SKU1.MAIN.JPG", true)]
    #[case("notes.txt", false)]
    #[case("items.json", false)]
    #[case("Makefile", false)]
    fn test_ensure_image(#[case] path: &str, #[case] allowed: bool) {
        assert_eq!(ensure_image(Path::new(path)).is_ok(), allowed);
    }

    #[tokio::test]
    async fn test_list_skips_non_images() {
        let (dir, backend) = setup();
        backend.write(Path::new("a.png"), b"png").await.unwrap();
        backend.write(Path::new("nested/b.webp"), b"webp").await.unwrap();
        // Bypass the filter to plant non-image files.
        std::fs::write(dir.path().join("items.json"), b"[]").unwrap();
        std::fs::write(dir.path().join("README.md"), b"#").unwrap();

        let mut paths: Vec<_> = backend.list(None).await.unwrap().into_iter().map(|f| f.path).collect();
        paths.sort();
        assert_eq!(paths, [PathBuf::from("a.png"), PathBuf::from("nested/b.webp")]);
    }

    #[tokio::test]
    async fn test_rejects_non_image_paths() {
        let (_dir, backend) = setup();
        let err = backend.write(Path::new("a.txt"), b"data").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        let err = backend.read(Path::new("a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        let err = backend.exists(Path::new("a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
    }

    #[tokio::test]
    async fn test_rename_checks_both_paths() {
        let (_dir, backend) = setup();
        backend.write(Path::new("a.png"), b"data").await.unwrap();
        let err = backend.rename(Path::new("a.png"), Path::new("a.txt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        let err = backend.rename(Path::new("a.txt"), Path::new("b.png")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FilteredPath(_)));
        backend.rename(Path::new("a.png"), Path::new("b.png")).await.unwrap();
        assert!(backend.exists(Path::new("b.png")).await.unwrap());
    }
}
