//! Image items as they sit on the board, before any renaming.

use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Opaque, stable identifier of an [`Item`].
///
/// Unique within a single [`OrderedCollection`](crate::OrderedCollection) for
/// the lifetime of the item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);
impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Handle to the binary content of an image.
///
/// What the handle points at is decided by whoever created it (the blob store
/// uses storage-relative paths). Releasing the underlying resource is the job
/// of the party that receives the owning [`Item`] on removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRef(String);
impl BlobRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Display for BlobRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// One image on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Filename the image arrived with.
    pub original_name: String,
    /// User override of the name shown for this item.
    pub display_name: Option<String>,
    pub size_bytes: u64,
    pub mime_type: String,
    /// `None` when the handle is stale (e.g. reloaded from a previous session)
    /// and has to be re-created before the content can be read.
    pub blob: Option<BlobRef>,
}
impl Item {
    pub fn new(
        id: impl Into<ItemId>,
        original_name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            display_name: None,
            size_bytes,
            mime_type: mime_type.into(),
            blob: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_blob(mut self, blob: BlobRef) -> Self {
        self.blob = Some(blob);
        self
    }

    /// The name currently shown for this item: the display override if set,
    /// otherwise the original filename.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.original_name)
    }

    /// Whether the blob handle must be re-created before use.
    pub fn is_stale(&self) -> bool {
        self.blob.is_none()
    }
}
