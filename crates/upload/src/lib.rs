//! Upload dispatcher for renamed image groups.
//!
//! A [`Dispatcher`] maps service names from configuration to [`Uploader`]s
//! and sends a group of derived items to one of them, reporting per item.
//! Hosts that are just "bytes under a name, served at a URL" go through
//! [`BackendUploader`] on top of a storage backend; anything else plugs in by
//! implementing [`Uploader`].

mod dispatch;
pub mod error;
mod service;
mod uploader;

pub use crate::dispatch::{DEFAULT_CONCURRENCY, Dispatcher, GroupReport, GroupStatus, ItemOutcome};
pub use crate::service::{
    CosService, CustomService, GitHubService, OssService, QiniuService, S3Service, Secret, ServiceKind,
};
pub use crate::uploader::{BackendUploader, Uploader};
