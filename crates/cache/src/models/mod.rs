//! Serialized forms of cached collections.
//!
//! Domain types never derive serde themselves; each gets a row type here and
//! a [`Cached`] implementation converting between the two.

mod derived;
mod item;

pub use self::derived::DerivedRow;
pub use self::item::ItemRow;
use crate::error::Result;
use orderly_board::BlobRef;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be stored in a [`CacheStore`](crate::CacheStore)
/// collection.
pub trait Cached: Sized {
    type Row: Serialize + DeserializeOwned;

    fn to_row(&self) -> Result<Self::Row>;
    fn from_row(row: Self::Row) -> Result<Self>;

    /// The blob handle, cleared on load when the blob no longer exists.
    fn blob_mut(&mut self) -> &mut Option<BlobRef>;
}
