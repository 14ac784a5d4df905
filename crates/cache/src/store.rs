use crate::BlobStore;
use crate::error::{ErrorKind, Result};
use crate::models::Cached;
use exn::ResultExt;
use orderly_storage::BackendHandle;
use orderly_storage::error::ErrorKind as StorageErrorKind;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// Key of the board's item collection.
pub const ITEMS_KEY: &str = "items";
/// Key of the derived (renamed) item collection.
pub const DERIVED_KEY: &str = "renamed";

/// Persists named collections as JSON documents on a storage backend.
///
/// Writes to the same key never interleave: each key has its own lock, and a
/// save lands in a temporary file that is renamed into place. There is no
/// ordering between different keys.
pub struct CacheStore {
    backend: BackendHandle,
    blobs: BlobStore,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}
impl CacheStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self {
            blobs: BlobStore::new(backend.clone()),
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The blob store sharing this cache's backend.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    fn path(key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            exn::bail!(ErrorKind::InvalidKey(key.to_string()));
        }
        Ok(PathBuf::from(format!("{key}.json")))
    }

    async fn lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.lock().await.entry(key.to_string()).or_default().clone()
    }

    /// Replace the collection stored under `key`.
    #[instrument(skip_all, fields(key = %key, count = values.len()))]
    pub async fn save_collection<T: Cached>(&self, key: &str, values: &[T]) -> Result<()> {
        let path = Self::path(key)?;
        let rows = values.iter().map(T::to_row).collect::<Result<Vec<_>>>()?;
        let json = serde_json::to_vec_pretty(&rows).or_raise(|| ErrorKind::InvalidData("collection"))?;
        let temp = path.with_extension("json.tmp");

        let lock = self.lock(key).await;
        let _guard = lock.lock().await;
        self.backend.write(&temp, &json).await.or_raise(|| ErrorKind::Storage)?;
        self.backend.rename(&temp, &path).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(bytes = json.len(), "Saved collection");
        Ok(())
    }

    /// Load the collection stored under `key`; a key never saved loads as
    /// empty.
    ///
    /// Blob handles whose blob is gone are cleared, marking those values
    /// stale.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn load_collection<T: Cached>(&self, key: &str) -> Result<Vec<T>> {
        let path = Self::path(key)?;
        let data = {
            let lock = self.lock(key).await;
            let _guard = lock.lock().await;
            match self.backend.read(&path).await {
                Ok(data) => data,
                Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
                    tracing::debug!("No cached collection");
                    return Ok(Vec::new());
                },
                Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
            }
        };
        let rows: Vec<T::Row> = serde_json::from_slice(&data).or_raise(|| ErrorKind::InvalidData("collection"))?;
        let mut values = rows.into_iter().map(T::from_row).collect::<Result<Vec<_>>>()?;

        let mut stale = 0;
        for value in &mut values {
            let blob = value.blob_mut();
            if let Some(handle) = blob.as_ref()
                && !self.blobs.exists(handle).await?
            {
                *blob = None;
                stale += 1;
            }
        }
        if stale > 0 {
            tracing::info!(stale, "Cleared stale blob handles");
        }
        tracing::debug!(count = values.len(), "Loaded collection");
        Ok(values)
    }

    /// Remove the collection stored under `key`. Clearing a missing key is
    /// not an error.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn clear(&self, key: &str) -> Result<()> {
        let path = Self::path(key)?;
        let lock = self.lock(key).await;
        let _guard = lock.lock().await;
        match self.backend.delete(&path).await {
            Ok(()) => Ok(()),
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => Ok(()),
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
        }
    }
}
