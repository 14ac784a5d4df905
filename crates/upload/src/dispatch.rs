use crate::error::{ErrorKind, Result};
use crate::service::ServiceKind;
use crate::uploader::Uploader;
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use orderly_cache::BlobStore;
use orderly_rename::{DerivedItem, GroupKey};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// What happened to one item of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Uploaded { url: String },
    Failed { message: String },
}
impl ItemOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// Overall result of uploading a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    /// Every item uploaded.
    Success,
    /// Nothing uploaded (an empty group counts as this too).
    Error,
    Partial,
}
impl GroupStatus {
    fn from_outcomes(outcomes: &[(String, ItemOutcome)]) -> Self {
        let uploaded = outcomes.iter().filter(|(_, o)| o.is_uploaded()).count();
        match uploaded {
            0 => Self::Error,
            n if n == outcomes.len() => Self::Success,
            _ => Self::Partial,
        }
    }
}
impl Display for GroupStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Partial => "partial",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group_key: GroupKey,
    pub service: String,
    /// `(derived name, outcome)` in the group's order.
    pub outcomes: Vec<(String, ItemOutcome)>,
    pub status: GroupStatus,
}

enum Registration {
    Ready(Arc<dyn Uploader>),
    Unavailable(String),
}

/// Sends derived-item groups to named upload services.
///
/// Items in a group upload concurrently, at most `concurrency` at a time.
/// One item failing never stops its siblings; failures end up in the
/// [`GroupReport`].
pub struct Dispatcher {
    services: HashMap<String, Registration>,
    concurrency: usize,
}
impl Dispatcher {
    pub fn new(concurrency: usize) -> Self {
        Self { services: HashMap::new(), concurrency: concurrency.max(1) }
    }

    /// Connect every configured service. Services that can't be connected
    /// stay known, so uploads to them fail per item with the reason instead
    /// of as an unknown service.
    pub async fn from_services(services: &BTreeMap<String, ServiceKind>, concurrency: usize) -> Self {
        let mut dispatcher = Self::new(concurrency);
        for (name, service) in services {
            match service.connect(name).await {
                Ok(uploader) => dispatcher.register(name.clone(), uploader),
                Err(err) => {
                    tracing::warn!(service = %name, kind = service.kind(), error = %err, "Upload service unavailable");
                    dispatcher.services.insert(name.clone(), Registration::Unavailable(err.to_string()));
                },
            }
        }
        dispatcher
    }

    /// Register (or replace) the uploader for `service`.
    pub fn register(&mut self, service: impl Into<String>, uploader: Arc<dyn Uploader>) {
        self.services.insert(service.into(), Registration::Ready(uploader));
    }

    /// Names of services that can be uploaded to.
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .services
            .iter()
            .filter(|(_, r)| matches!(r, Registration::Ready(_)))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn uploader(&self, service: &str) -> Result<&Arc<dyn Uploader>> {
        match self.services.get(service) {
            Some(Registration::Ready(uploader)) => Ok(uploader),
            Some(Registration::Unavailable(reason)) => exn::bail!(ErrorKind::Unsupported(reason.clone())),
            None => exn::bail!(ErrorKind::UnknownService(service.to_string())),
        }
    }

    /// Upload every item of one group to `service`.
    #[instrument(skip_all, fields(group = %group_key, service = %service, items = items.len()))]
    pub async fn upload(
        &self,
        service: &str,
        group_key: &GroupKey,
        items: &[&DerivedItem],
        blobs: &BlobStore,
    ) -> GroupReport {
        let outcomes: Vec<(String, ItemOutcome)> = match self.uploader(service) {
            Err(err) => {
                tracing::warn!(error = %err, "Cannot upload group");
                let message = err.to_string();
                items
                    .iter()
                    .map(|item| (item.derived_name.clone(), ItemOutcome::Failed { message: message.clone() }))
                    .collect()
            },
            Ok(uploader) => {
                futures::stream::iter(items)
                    .map(|item| async move {
                        let outcome = match upload_one(uploader.as_ref(), item, blobs).await {
                            Ok(url) => ItemOutcome::Uploaded { url },
                            Err(err) => {
                                tracing::warn!(name = %item.derived_name, error = ?err, "Item upload failed");
                                ItemOutcome::Failed { message: err.to_string() }
                            },
                        };
                        (item.derived_name.clone(), outcome)
                    })
                    .buffered(self.concurrency)
                    .collect()
                    .await
            },
        };
        let status = GroupStatus::from_outcomes(&outcomes);
        tracing::info!(%status, "Group upload finished");
        GroupReport {
            group_key: group_key.clone(),
            service: service.to_string(),
            outcomes,
            status,
        }
    }
}

async fn upload_one(uploader: &dyn Uploader, item: &DerivedItem, blobs: &BlobStore) -> Result<String> {
    let blob = item.item.blob.as_ref().ok_or_raise(|| ErrorKind::MissingBlob(item.derived_name.clone()))?;
    let bytes = blobs.get(blob).await.or_raise(|| ErrorKind::MissingBlob(item.derived_name.clone()))?;
    uploader.upload(&item.derived_name, &bytes).await
}
