//! The working state of one invocation: the board and derived items, loaded
//! from the cache on open and written back on [`Session::save`].
//!
//! Blobs dropped by `remove`/`clear_*` are only released once a save has
//! persisted the collections that no longer reference them.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use orderly_board::{BlobRef, Board, Item, ItemId};
use orderly_cache::{CacheStore, DERIVED_KEY, ITEMS_KEY};
use orderly_rename::{DerivedItem, Group, GroupKey, Renamer, RuleParameters, group_derived};
use orderly_storage::ImageFormat;
use orderly_upload::{Dispatcher, GroupReport};
use std::collections::HashSet;
use std::path::Path;
use time::UtcDateTime;
use tracing::instrument;

pub struct Session {
    board: Board,
    derived: Vec<DerivedItem>,
    cache: CacheStore,
    /// Blobs of removed items, released after the next successful save.
    released: Vec<BlobRef>,
}

impl Session {
    #[instrument(skip_all)]
    pub async fn open(cache: CacheStore) -> Result<Self> {
        let items: Vec<Item> = cache.load_collection(ITEMS_KEY).await.or_raise(|| ErrorKind::Cache)?;
        let derived: Vec<DerivedItem> = cache.load_collection(DERIVED_KEY).await.or_raise(|| ErrorKind::Cache)?;
        let board = Board::from_items(items).or_raise(|| ErrorKind::Cache)?;
        tracing::debug!(items = board.items().len(), derived = derived.len(), "Opened session");
        Ok(Self { board, derived, cache, released: Vec::new() })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn derived(&self) -> &[DerivedItem] {
        &self.derived
    }

    pub fn groups(&self) -> Vec<Group<'_>> {
        group_derived(&self.derived)
    }

    /// Persist both collections, then release blobs nothing refers to any
    /// more. A failed save keeps every blob.
    pub async fn save(&mut self) -> Result<()> {
        self.cache.save_collection(ITEMS_KEY, self.board.items().as_slice()).await.or_raise(|| ErrorKind::Cache)?;
        self.cache.save_collection(DERIVED_KEY, &self.derived).await.or_raise(|| ErrorKind::Cache)?;
        let released = std::mem::take(&mut self.released);
        self.release_unreferenced(released).await
    }

    /// Smallest numeric id above every id on the board.
    fn next_id(&self) -> ItemId {
        let max = self.board.items().iter().filter_map(|item| item.id.as_str().parse::<u64>().ok()).max();
        ItemId::from(max.map_or(1, |n| n + 1).to_string())
    }

    /// Import an image, storing its bytes in the blob store.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn add(&mut self, name: &str, bytes: &[u8]) -> Result<ItemId> {
        let format = ImageFormat::from_path(name)
            .ok_or_else(|| exn::Exn::from(ErrorKind::Import(name.into(), "not a recognised image".to_string())))?;
        let blob = self.cache.blobs().put(name, format.mime_type(), bytes).await.or_raise(|| ErrorKind::Cache)?;
        let id = self.next_id();
        let item = Item::new(id.clone(), name, bytes.len() as u64, format.mime_type()).with_blob(blob);
        self.board.append(item).or_raise(|| ErrorKind::Board)?;
        Ok(id)
    }

    pub async fn add_file(&mut self, path: &Path) -> Result<ItemId> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| exn::Exn::from(ErrorKind::Import(path.to_path_buf(), "no usable file name".to_string())))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| exn::Exn::from(ErrorKind::Import(path.to_path_buf(), e.to_string())))?;
        self.add(name, &bytes).await
    }

    /// Remove an item from the board. Its blob is released by the next
    /// [`save`](Self::save) unless something else still points at it.
    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let item = self.board.remove(id).or_raise(|| ErrorKind::Board)?;
        self.released.extend(item.blob.iter().cloned());
        Ok(item)
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.board.move_item(from, to).or_raise(|| ErrorKind::Board)
    }

    /// Select `ids` in the given order and rename the selection. The derived
    /// items are kept; the selection is reset afterwards, whether or not the
    /// rename succeeded.
    pub fn rename(&mut self, ids: &[String], parameters: RuleParameters) -> Result<GroupKey> {
        self.rename_at(ids, parameters, UtcDateTime::now())
    }

    #[instrument(skip_all, fields(mode = %parameters.mode, selected = ids.len()))]
    fn rename_at(&mut self, ids: &[String], parameters: RuleParameters, created_at: UtcDateTime) -> Result<GroupKey> {
        let renamer = Renamer::new(parameters).or_raise(|| ErrorKind::Rename)?;
        self.board.reset_selection();
        let derived = self.derive_selection(&renamer, ids, created_at);
        self.board.reset_selection();
        let derived = derived?;
        let key = derived[0].group_key.clone();
        // Group keys have millisecond resolution; two renames with the same
        // prefix in one millisecond would otherwise merge into one group.
        if self.derived.iter().any(|d| d.group_key == key) {
            exn::bail!(ErrorKind::DuplicateGroup(key.to_string()));
        }
        self.derived.extend(derived);
        Ok(key)
    }

    fn derive_selection(&mut self, renamer: &Renamer, ids: &[String], created_at: UtcDateTime) -> Result<Vec<DerivedItem>> {
        for id in ids {
            if !self.board.toggle(id).or_raise(|| ErrorKind::Board)? {
                exn::bail!(ErrorKind::DuplicateSelection(id.clone()));
            }
        }
        let derived = renamer.apply_at(self.board.selected_items(), created_at);
        if derived.is_empty() {
            exn::bail!(ErrorKind::Rename);
        }
        Ok(derived)
    }

    pub fn group(&self, key: &str) -> Result<Group<'_>> {
        self.groups()
            .into_iter()
            .find(|g| g.key.as_str() == key)
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnknownGroup(key.to_string())))
    }

    /// Upload one derived group through `dispatcher`.
    pub async fn upload(&self, group: &str, service: &str, dispatcher: &Dispatcher) -> Result<GroupReport> {
        let group = self.group(group)?;
        Ok(dispatcher.upload(service, group.key, &group.items, self.cache.blobs()).await)
    }

    /// Remove every board item, returning how many there were.
    pub fn clear_items(&mut self) -> usize {
        let items = self.board.clear();
        self.released.extend(items.iter().filter_map(|item| item.blob.clone()));
        items.len()
    }

    /// Drop every derived item, returning how many there were.
    pub fn clear_derived(&mut self) -> usize {
        let derived = std::mem::take(&mut self.derived);
        self.released.extend(derived.iter().filter_map(|d| d.item.blob.clone()));
        derived.len()
    }

    fn live_blobs(&self) -> HashSet<&BlobRef> {
        self.board
            .items()
            .iter()
            .filter_map(|item| item.blob.as_ref())
            .chain(self.derived.iter().filter_map(|d| d.item.blob.as_ref()))
            .collect()
    }

    /// Content-addressed blobs are shared by identical images and by derived
    /// copies, so only blobs nothing refers to any more are released.
    async fn release_unreferenced(&self, candidates: impl IntoIterator<Item = BlobRef>) -> Result<()> {
        let unreferenced: HashSet<BlobRef> = {
            let live = self.live_blobs();
            candidates.into_iter().filter(|blob| !live.contains(blob)).collect()
        };
        for blob in unreferenced {
            self.cache.blobs().release(blob).await.or_raise(|| ErrorKind::Cache)?;
        }
        Ok(())
    }
}
