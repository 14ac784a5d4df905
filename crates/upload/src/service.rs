//! Configured image hosts.
//!
//! Each service is one variant of [`ServiceKind`], tagged by `kind` in
//! configuration files:
//!
//! ```toml
//! [services.shop]
//! kind = "custom"
//! root = "/srv/www/images"
//! public_url = "https://img.example.com"
//!
//! [services.bucket]
//! kind = "s3"
//! bucket = "product-images"
//! region = "eu-west-1"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! ```

use crate::error::{ErrorKind, Result};
use crate::uploader::{BackendUploader, Uploader};
use exn::ResultExt;
use orderly_storage::backend::LocalBackend;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;

/// A credential that never shows up in logs or debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}
impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Secret(***)")
    }
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubService {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Directory inside the repository.
    #[serde(default)]
    pub path: String,
    pub token: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Service {
    pub bucket: String,
    pub region: String,
    /// Only needed for S3-compatible services other than AWS.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: Secret,
    /// Base URL objects are served from; defaults to the AWS virtual-hosted URL.
    #[serde(default)]
    pub public_url: Option<String>,
}
impl S3Service {
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.clone(),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosService {
    pub bucket: String,
    pub region: String,
    pub secret_id: String,
    pub secret_key: Secret,
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OssService {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub access_key_secret: Secret,
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QiniuService {
    pub bucket: String,
    pub access_key: String,
    pub secret_key: Secret,
    /// Domain bound to the bucket, used to build public URLs.
    pub domain: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// A directory that some web server publishes under `public_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomService {
    pub root: PathBuf,
    pub public_url: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// An image host, with the credentials it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ServiceKind {
    GitHub(GitHubService),
    S3(S3Service),
    Cos(CosService),
    Oss(OssService),
    Qiniu(QiniuService),
    Custom(CustomService),
}
impl ServiceKind {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GitHub(_) => "github",
            Self::S3(_) => "s3",
            Self::Cos(_) => "cos",
            Self::Oss(_) => "oss",
            Self::Qiniu(_) => "qiniu",
            Self::Custom(_) => "custom",
        }
    }

    /// Build the uploader for this service.
    ///
    /// # Errors
    ///
    /// [`Unsupported`](ErrorKind::Unsupported) for hosts this build has no
    /// client for; register an [`Uploader`] for those by hand.
    /// [`InvalidService`](ErrorKind::InvalidService) when the configuration
    /// can't be used (a relative `root`, a bad bucket prefix).
    pub async fn connect(&self, name: &str) -> Result<Arc<dyn Uploader>> {
        match self {
            Self::Custom(custom) => {
                let backend = LocalBackend::new(name, &custom.root)
                    .or_raise(|| ErrorKind::InvalidService(name.to_string()))?;
                let uploader =
                    BackendUploader::new(Arc::new(backend), &custom.public_url).with_prefix(custom.prefix.clone());
                Ok(Arc::new(uploader))
            },
            #[cfg(feature = "s3")]
            Self::S3(s3) => {
                let backend = orderly_storage::backend::S3Backend::new(
                    name,
                    &s3.bucket,
                    None,
                    &s3.region,
                    s3.endpoint.clone(),
                    &s3.access_key_id,
                    s3.secret_access_key.expose(),
                )
                .await
                .or_raise(|| ErrorKind::InvalidService(name.to_string()))?;
                let uploader = BackendUploader::new(Arc::new(backend), s3.public_url()).with_prefix(s3.prefix.clone());
                Ok(Arc::new(uploader))
            },
            #[cfg(not(feature = "s3"))]
            Self::S3(_) => exn::bail!(ErrorKind::Unsupported(format!("{name}: built without the `s3` feature"))),
            other => exn::bail!(ErrorKind::Unsupported(format!("{name}: no built-in {} client", other.kind()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_deserialize_tagged() {
        let json = r#"{"kind":"github","owner":"acme","repo":"assets","token":"ghp_x"}"#;
        let ServiceKind::GitHub(github) = serde_json::from_str::<ServiceKind>(json).unwrap() else {
            panic!("expected github");
        };
        assert_eq!(github.branch, "main");
        assert_eq!(github.token.expose(), "ghp_x");
    }

    #[test]
    fn test_secret_is_redacted() {
        let service = ServiceKind::Qiniu(QiniuService {
            bucket: "b".to_string(),
            access_key: "ak".to_string(),
            secret_key: Secret::new("hunter2"),
            domain: "cdn.example.com".to_string(),
            prefix: None,
        });
        assert!(!format!("{service:?}").contains("hunter2"));
    }

    #[rstest]
    #[case(r#"{"kind":"s3","bucket":"b","region":"r","access_key_id":"a","secret_access_key":"s"}"#, "s3")]
    #[case(r#"{"kind":"cos","bucket":"b","region":"r","secret_id":"a","secret_key":"s"}"#, "cos")]
    #[case(r#"{"kind":"oss","bucket":"b","region":"r","access_key_id":"a","access_key_secret":"s"}"#, "oss")]
    #[case(r#"{"kind":"custom","root":"/srv/img","public_url":"https://img"}"#, "custom")]
    fn test_kind(#[case] json: &str, #[case] kind: &str) {
        assert_eq!(serde_json::from_str::<ServiceKind>(json).unwrap().kind(), kind);
    }

    #[test]
    fn test_s3_default_public_url() {
        let json = r#"{"kind":"s3","bucket":"shop","region":"eu-west-1","access_key_id":"a","secret_access_key":"s"}"#;
        let ServiceKind::S3(s3) = serde_json::from_str::<ServiceKind>(json).unwrap() else {
            panic!("expected s3");
        };
        assert_eq!(s3.public_url(), "https://shop.s3.eu-west-1.amazonaws.com");
    }

    #[tokio::test]
    async fn test_connect_unsupported() {
        let service: ServiceKind =
            serde_json::from_str(r#"{"kind":"github","owner":"o","repo":"r","token":"t"}"#).unwrap();
        let Err(err) = service.connect("gh").await else {
            panic!("expected error");
        };
        assert!(matches!(&*err, ErrorKind::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_connect_custom() {
        let dir = tempfile::tempdir().unwrap();
        let service = ServiceKind::Custom(CustomService {
            root: dir.path().to_path_buf(),
            public_url: "https://img.example.com/".to_string(),
            prefix: Some("products".to_string()),
        });
        let uploader = service.connect("shop").await.unwrap();
        let url = uploader.upload("SKU1.MAIN.jpg", b"jpg").await.unwrap();
        assert_eq!(url, "https://img.example.com/products/SKU1.MAIN.jpg");
        assert_eq!(std::fs::read(dir.path().join("products/SKU1.MAIN.jpg")).unwrap(), b"jpg");
    }
}
