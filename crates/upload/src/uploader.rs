use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use orderly_storage::BackendHandle;
use std::path::Path;
use tracing::instrument;

/// Sends one named image to a host and reports where it can be fetched.
///
/// This is the only seam between the dispatcher and a provider: anything
/// that can store bytes under a name and hand back a URL can be registered
/// with a [`Dispatcher`](crate::Dispatcher).
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Upload `bytes` as `name`, returning the public URL.
    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<String>;
}

/// Uploads by writing to a [`StorageBackend`](orderly_storage::StorageBackend)
/// that some host serves at `public_url`.
pub struct BackendUploader {
    backend: BackendHandle,
    public_url: String,
    prefix: Option<String>,
}
impl BackendUploader {
    pub fn new(backend: BackendHandle, public_url: impl Into<String>) -> Self {
        Self { backend, public_url: public_url.into(), prefix: None }
    }

    /// Place uploads under `prefix` inside the backend (and the URL).
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix.map(|p| p.trim_matches('/').to_string()).filter(|p| !p.is_empty());
        self
    }

    fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{name}"),
            None => name.to_string(),
        }
    }
}

#[async_trait]
impl Uploader for BackendUploader {
    fn name(&self) -> &str {
        self.backend.name()
    }

    #[instrument(skip_all, fields(service = self.backend.name(), name = %name))]
    async fn upload(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let key = self.key(name);
        self.backend.write(Path::new(&key), bytes).await.or_raise(|| ErrorKind::Storage)?;
        let url = format!("{}/{key}", self.public_url.trim_end_matches('/'));
        tracing::debug!(%url, bytes = bytes.len(), "Uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderly_storage::StorageBackend;
    use orderly_storage::backend::MockBackend;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case(None, "https://cdn.example.com", "https://cdn.example.com/a.png")]
    #[case(Some("/sets/"), "https://cdn.example.com/", "https://cdn.example.com/sets/a.png")]
    #[case(Some(""), "https://cdn.example.com", "https://cdn.example.com/a.png")]
    #[tokio::test]
    async fn test_upload_url(#[case] prefix: Option<&str>, #[case] public_url: &str, #[case] expected: &str) {
        let backend = Arc::new(MockBackend::default());
        let uploader = BackendUploader::new(backend.clone(), public_url).with_prefix(prefix.map(str::to_string));
        assert_eq!(uploader.upload("a.png", b"png").await.unwrap(), expected);
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_escaping_names() {
        let backend = Arc::new(MockBackend::default());
        let uploader = BackendUploader::new(backend.clone(), "https://cdn");
        let err = uploader.upload("../a.png", b"png").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage));
        assert!(!backend.exists(Path::new("a.png")).await.unwrap());
    }
}
