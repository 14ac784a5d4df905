//! Persistent cache for the board's working state.
//!
//! The cache is not the source of truth while a session runs; the in-memory
//! board is. It exists so a later session can pick up where the last one
//! left off, and losing it only loses that convenience.
//!
//! # Layout
//! On the configured storage backend:
//! - `items.json`: the board's items in display order ([`ITEMS_KEY`]).
//! - `renamed.json`: derived items from every rename action ([`DERIVED_KEY`]).
//! - `blobs/{blake3}.{ext}`: image bytes, content-addressed ([`BlobStore`]).

mod blob;
pub mod error;
mod models;
mod store;

pub use crate::blob::{BLOB_DIR, BlobStore};
pub use crate::models::{Cached, DerivedRow, ItemRow};
pub use crate::store::{CacheStore, DERIVED_KEY, ITEMS_KEY};
