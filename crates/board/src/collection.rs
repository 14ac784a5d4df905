//! The ordered item list and its reorder operations.

use crate::error::{ErrorKind, Result};
use crate::observer::{Observers, Subscription};
use crate::{Item, ItemId};

/// A sequence of [`Item`]s where position is display order.
///
/// Items are addressed by [`ItemId`] or by index, never by reference, and ids
/// are unique within the collection. Every successful mutation notifies the
/// registered observers with the new display order.
#[derive(Debug, Default)]
pub struct OrderedCollection {
    items: Vec<Item>,
    observers: Observers,
}
impl OrderedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from already-ordered items, e.g. when restoring a
    /// cached session. Fails on the first duplicate id.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self> {
        let mut collection = Self::new();
        for item in items {
            collection.push(item)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&[ItemId]) + Send + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    fn push(&mut self, item: Item) -> Result<()> {
        if self.contains(item.id.as_str()) {
            exn::bail!(ErrorKind::DuplicateItem(item.id.to_string()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Append an item to the end of the collection.
    pub fn append(&mut self, item: Item) -> Result<()> {
        tracing::debug!(id = %item.id, "Appending item");
        self.push(item)?;
        self.notify();
        Ok(())
    }

    /// Remove an item, handing ownership (and with it, its blob handle) back
    /// to the caller.
    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let Some(index) = self.position(id) else {
            exn::bail!(ErrorKind::UnknownItem(id.to_string()));
        };
        let item = self.items.remove(index);
        tracing::debug!(%id, index, "Removed item");
        self.notify();
        Ok(item)
    }

    /// Remove every item, returning them in their former display order.
    pub fn clear(&mut self) -> Vec<Item> {
        let items = std::mem::take(&mut self.items);
        self.notify();
        items
    }

    /// Swap the items at `from` and `to`.
    ///
    /// This is a direct two-element swap (the dragged item and the hovered
    /// item trade places), not a remove-and-insert shift. Swapping a position
    /// with itself does nothing and notifies nobody.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                exn::bail!(ErrorKind::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        self.items.swap(from, to);
        tracing::trace!(from, to, "Swapped items");
        self.notify();
        Ok(())
    }

    /// Set (or with `None`, reset) the display name of an item.
    pub fn set_display_name(&mut self, id: &str, name: Option<String>) -> Result<()> {
        let Some(item) = self.items.iter_mut().find(|item| item.id.as_str() == id) else {
            exn::bail!(ErrorKind::UnknownItem(id.to_string()));
        };
        item.display_name = name;
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let ids = self.ids();
        self.observers.notify(&ids);
    }
}
