//! Content-addressed storage for image bytes.
//!
//! Blobs live under `blobs/` as `{blake3 hex}.{ext}`. Identical content maps
//! to the same [`BlobRef`], so releasing a blob is only safe once nothing
//! references it any more.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use orderly_board::BlobRef;
use orderly_storage::backend::ImageOnlyBackend;
use orderly_storage::error::ErrorKind as StorageErrorKind;
use orderly_storage::{BackendHandle, ImageFormat};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

pub const BLOB_DIR: &str = "blobs";

#[derive(Clone)]
pub struct BlobStore {
    backend: BackendHandle,
}
impl BlobStore {
    /// Wrap `backend`; only image paths will ever be read or written.
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend: Arc::new(ImageOnlyBackend::new(backend)) }
    }

    fn path(blob: &BlobRef) -> PathBuf {
        PathBuf::from(blob.as_str())
    }

    /// Store `bytes`, returning the handle for them.
    ///
    /// The format is taken from `mime_type`, falling back to the extension of
    /// `name`. Storing the same content twice returns the same handle without
    /// writing again.
    #[instrument(skip_all, fields(name = %name, bytes = bytes.len()))]
    pub async fn put(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobRef> {
        let format = ImageFormat::from_mime(mime_type)
            .or_else(|| ImageFormat::from_path(name))
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnsupportedFormat(mime_type.to_string())))?;
        let hash = blake3::hash(bytes).to_hex();
        let blob = BlobRef::new(format!("{BLOB_DIR}/{hash}.{}", format.extension()));
        let path = Self::path(&blob);
        if self.backend.exists(&path).await.or_raise(|| ErrorKind::Storage)? {
            tracing::trace!(%blob, "Blob already stored");
            return Ok(blob);
        }
        self.backend.write(&path, bytes).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(%blob, "Stored blob");
        Ok(blob)
    }

    pub async fn get(&self, blob: &BlobRef) -> Result<Vec<u8>> {
        match self.backend.read(&Self::path(blob)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                Err(e).or_raise(|| ErrorKind::MissingBlob(blob.to_string()))
            },
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
        }
    }

    pub async fn exists(&self, blob: &BlobRef) -> Result<bool> {
        match self.backend.exists(&Self::path(blob)).await {
            Ok(exists) => Ok(exists),
            // A handle that was never a valid image path can't exist.
            Err(e) if matches!(&*e, StorageErrorKind::FilteredPath(_) | StorageErrorKind::InvalidPath(_)) => Ok(false),
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
        }
    }

    /// Delete the blob behind `blob`. Releasing an already missing blob is
    /// not an error.
    pub async fn release(&self, blob: BlobRef) -> Result<()> {
        match self.backend.delete(&Self::path(&blob)).await {
            Ok(()) => {
                tracing::debug!(%blob, "Released blob");
                Ok(())
            },
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                tracing::debug!(%blob, "Blob already released");
                Ok(())
            },
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
        }
    }

    /// Delete every stored blob not in `live`, returning how many went.
    #[instrument(skip_all, fields(live = live.len()))]
    pub async fn prune(&self, live: &HashSet<BlobRef>) -> Result<usize> {
        let stored = self.backend.list(Some(Path::new(BLOB_DIR))).await.or_raise(|| ErrorKind::Storage)?;
        let mut pruned = 0;
        for file in stored {
            let Some(path) = file.path.to_str() else { continue };
            let blob = BlobRef::new(path);
            if !live.contains(&blob) {
                self.release(blob).await?;
                pruned += 1;
            }
        }
        tracing::info!(pruned, "Pruned unreferenced blobs");
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderly_storage::backend::MockBackend;

    fn store() -> (Arc<MockBackend>, BlobStore) {
        let backend = Arc::new(MockBackend::default());
        (backend.clone(), BlobStore::new(backend))
    }

    #[tokio::test]
    async fn test_put_is_content_addressed() {
        let (backend, blobs) = store();
        let a = blobs.put("a.png", "image/png", b"same").await.unwrap();
        let b = blobs.put("b.png", "image/png", b"same").await.unwrap();
        let c = blobs.put("c.png", "image/png", b"different").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("blobs/") && a.as_str().ends_with(".png"));
        assert_eq!(backend.len().await, 2);
        assert_eq!(blobs.get(&a).await.unwrap(), b"same");
    }

    #[tokio::test]
    async fn test_put_falls_back_to_name() {
        let (_backend, blobs) = store();
        let blob = blobs.put("photo.JPG", "application/octet-stream", b"jpg").await.unwrap();
        assert!(blob.as_str().ends_with(".jpg"));
        let err = blobs.put("notes.txt", "text/plain", b"txt").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let (_backend, blobs) = store();
        let blob = blobs.put("a.gif", "image/gif", b"gif").await.unwrap();
        assert!(blobs.exists(&blob).await.unwrap());
        blobs.release(blob.clone()).await.unwrap();
        assert!(!blobs.exists(&blob).await.unwrap());
        blobs.release(blob.clone()).await.unwrap();
        let err = blobs.get(&blob).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingBlob(_)));
    }

    #[tokio::test]
    async fn test_exists_for_foreign_handle() {
        let (_backend, blobs) = store();
        assert!(!blobs.exists(&BlobRef::new("blob:http://localhost/123")).await.unwrap());
        assert!(!blobs.exists(&BlobRef::new("../escape.png")).await.unwrap());
    }

    #[tokio::test]
    async fn test_prune_keeps_live_blobs() {
        let (backend, blobs) = store();
        let keep = blobs.put("a.png", "image/png", b"keep").await.unwrap();
        blobs.put("b.png", "image/png", b"drop").await.unwrap();
        let live = HashSet::from([keep.clone()]);
        assert_eq!(blobs.prune(&live).await.unwrap(), 1);
        assert_eq!(backend.len().await, 1);
        assert!(blobs.exists(&keep).await.unwrap());
    }
}
