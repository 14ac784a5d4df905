//! S3-compatible storage backend.
//!
//! Covers AWS S3 and the S3-compatible APIs other image hosts expose (MinIO,
//! Backblaze B2, Cloudflare R2). Credentials are passed explicitly from the
//! service configuration.

use crate::{
    FileInfo, StorageBackend,
    backend::FileInfoStream,
    error::{ErrorKind, Result},
    validate_path,
};
use async_stream::stream;
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    error::{DisplayErrorContext, SdkError},
    primitives::{ByteStream, DateTime},
};
use exn::{OptionExt, ResultExt};
use std::error::Error as StdError;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Generous default for concurrent S3 requests.
const DEFAULT_CONCURRENT_REQUESTS: usize = 32;

/// S3-compatible storage backend.
///
/// Stores files in a bucket, optionally under a key prefix. All paths are
/// relative to that prefix.
///
/// ```no_run
/// use orderly_storage::backend::S3Backend;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = S3Backend::new(
///     "images",
///     "my-bucket",
///     Some("products/".to_string()),
///     "us-east-1",
///     None::<String>,
///     "access_key_id",
///     "secret_access_key",
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    prefix: Option<String>,
    rate_limiter: Arc<Semaphore>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// `endpoint` is only needed for non-AWS services; path-style addressing
    /// is always used so those work without DNS bucket names.
    pub async fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        prefix: Option<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Result<Self> {
        let prefix = prefix
            .filter(|p| !p.trim_matches('/').is_empty())
            .map(validate_path)
            .transpose()?
            .map(|p| p.to_str().map(str::to_string).ok_or_raise(|| ErrorKind::InvalidPath(p)))
            .transpose()?;
        let credentials = Credentials::new(key_id, key_secret, None, None, "orderly-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region.into()))
            // 1 initial attempt + 3 retries with exponential backoff.
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            .force_path_style(true);
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }
        Ok(Self {
            name: name.into(),
            client: Client::from_conf(config_builder.build()),
            bucket: bucket.into(),
            prefix,
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        })
    }

    fn full_key(&self, path: &Path) -> Result<String> {
        full_key(self.prefix.as_deref(), path)
    }

    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        self.rate_limiter
            .clone()
            .acquire_owned()
            .await
            .or_raise(|| ErrorKind::BackendError("S3 rate limiter closed".to_string()))
    }

    async fn head(&self, path: &Path) -> Result<Option<FileInfo>> {
        let key = self.full_key(path)?;
        let _permit = self.acquire_permit().await?;
        match self.client.head_object().bucket(&self.bucket).key(&key).send().await {
            Ok(output) => {
                let size = output.content_length().unwrap_or_default().max(0) as u64;
                let modified = output.last_modified().map(parse_datetime).transpose()?;
                Ok(Some(FileInfo::new(
                    validate_path(path)?,
                    size,
                    modified.unwrap_or(OffsetDateTime::UNIX_EPOCH),
                )))
            },
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(None),
            Err(err) => exn::bail!(map_sdk_error(err)),
        }
    }
}

/// Join the optional bucket prefix and a validated relative path.
fn full_key(prefix: Option<&str>, path: &Path) -> Result<String> {
    let validated = validate_path(path)?;
    let path_str = validated.to_str().ok_or_raise(|| ErrorKind::InvalidPath(validated.clone()))?;
    Ok(match prefix {
        Some(prefix) => format!("{}/{path_str}", prefix.trim_end_matches('/')),
        None => path_str.to_string(),
    })
}

/// Strip the bucket prefix from a listed key.
fn relative_path(prefix: Option<&str>, key: &str) -> Result<PathBuf> {
    let relative = match prefix {
        Some(prefix) => key
            .strip_prefix(prefix.trim_end_matches('/'))
            .and_then(|s| s.strip_prefix('/'))
            .ok_or_raise(|| ErrorKind::BackendError(format!("key `{key}` is outside prefix `{prefix}`")))?,
        None => key,
    };
    validate_path(relative)
}

fn parse_datetime(dt: &DateTime) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(dt.as_nanos())
        .or_raise(|| ErrorKind::BackendError("S3 datetime out of range".to_string()))
}

fn map_sdk_error<E, R>(err: SdkError<E, R>) -> ErrorKind
where
    E: StdError + Send + Sync + 'static,
    R: Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ErrorKind::Network(message),
        _ => ErrorKind::BackendError(message),
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        // Listing is per path component, so a sub-prefix becomes a "directory".
        let list_prefix = match prefix.map(|p| self.full_key(p)).transpose() {
            Ok(Some(key)) => Some(format!("{key}/")),
            Ok(None) => self.prefix.as_ref().map(|p| format!("{}/", p.trim_end_matches('/'))),
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(list_prefix)
                .into_paginator()
                .send();
            loop {
                let page = {
                    let _permit = match self.acquire_permit().await {
                        Ok(permit) => permit,
                        Err(e) => { yield Err(e); break; },
                    };
                    pages.next().await
                };
                let page = match page {
                    None => break,
                    Some(Ok(page)) => page,
                    Some(Err(err)) => {
                        yield Err(exn::Exn::from(map_sdk_error(err)));
                        break;
                    },
                };
                for object in page.contents() {
                    let Some(key) = object.key() else { continue };
                    // Zero-byte "folder" markers.
                    if key.ends_with('/') {
                        continue;
                    }
                    let path = match relative_path(self.prefix.as_deref(), key) {
                        Ok(path) => path,
                        Err(e) => { yield Err(e); continue; },
                    };
                    let modified = match object.last_modified().map(parse_datetime).transpose() {
                        Ok(modified) => modified.unwrap_or(OffsetDateTime::UNIX_EPOCH),
                        Err(e) => { yield Err(e); continue; },
                    };
                    let size = object.size().unwrap_or_default().max(0) as u64;
                    yield Ok(FileInfo::new(path, size, modified));
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.head(path).await?.is_some())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let key = self.full_key(path)?;
        let _permit = self.acquire_permit().await?;
        let output = match self.client.get_object().bucket(&self.bucket).key(&key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()))
            },
            Err(err) => exn::bail!(map_sdk_error(err)),
        };
        let body = output.body.collect().await.or_raise(|| ErrorKind::Network(format!("reading body of {key}")))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let key = self.full_key(path)?;
        let content_type = crate::ImageFormat::from_path(path).map_or("application/octet-stream", |f| f.mime_type());
        let _permit = self.acquire_permit().await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(map_sdk_error)?;
        tracing::debug!(backend = %self.name, %key, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        // DeleteObject succeeds for missing keys; check first to report NotFound.
        if self.head(path).await?.is_none() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let key = self.full_key(path)?;
        let _permit = self.acquire_permit().await?;
        self.client.delete_object().bucket(&self.bucket).key(&key).send().await.map_err(map_sdk_error)?;
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from_key = self.full_key(from)?;
        let to_key = self.full_key(to)?;
        {
            let _permit = self.acquire_permit().await?;
            match self
                .client
                .copy_object()
                .bucket(&self.bucket)
                .copy_source(format!("{}/{from_key}", self.bucket))
                .key(&to_key)
                .send()
                .await
            {
                Ok(_) => {},
                Err(err) if err.raw_response().is_some_and(|r| r.status().as_u16() == 404) => {
                    exn::bail!(ErrorKind::NotFound(from.to_path_buf()))
                },
                Err(err) => exn::bail!(map_sdk_error(err)),
            }
        }
        let _permit = self.acquire_permit().await?;
        if let Err(err) = self.client.delete_object().bucket(&self.bucket).key(&from_key).send().await {
            tracing::warn!(
                backend = %self.name,
                from = %from_key,
                to = %to_key,
                error = %DisplayErrorContext(&err),
                "Copied object but failed to delete the source"
            );
        }
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.head(path).await?.ok_or_raise(|| ErrorKind::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "SKU1/SKU1.MAIN.jpg", "SKU1/SKU1.MAIN.jpg")]
    #[case(Some("products"), "SKU1/SKU1.MAIN.jpg", "products/SKU1/SKU1.MAIN.jpg")]
    #[case(Some("products/"), "./SKU1.MAIN.jpg", "products/SKU1.MAIN.jpg")]
    fn test_full_key(#[case] prefix: Option<&str>, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(full_key(prefix, Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn test_full_key_rejects_escape() {
        assert!(full_key(Some("products"), Path::new("../secret.png")).is_err());
    }

    #[rstest]
    #[case(None, "a/b.png", "a/b.png")]
    #[case(Some("products"), "products/a/b.png", "a/b.png")]
    #[case(Some("products/"), "products/b.png", "b.png")]
    fn test_relative_path(#[case] prefix: Option<&str>, #[case] key: &str, #[case] expected: &str) {
        assert_eq!(relative_path(prefix, key).unwrap(), Path::new(expected));
    }

    #[test]
    fn test_relative_path_outside_prefix() {
        assert!(relative_path(Some("products"), "productsX/a.png").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let dt = DateTime::from_secs(1_700_000_000);
        assert_eq!(parse_datetime(&dt).unwrap().unix_timestamp(), 1_700_000_000);
    }
}
