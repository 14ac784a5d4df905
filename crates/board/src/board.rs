use crate::collection::OrderedCollection;
use crate::drag::{Bounds, DragSession};
use crate::error::{ErrorKind, Result};
use crate::observer::Subscription;
use crate::selection::SelectionTracker;
use crate::{Item, ItemId};

/// The working set: items in display order plus the ordered selection.
///
/// All mutations go through the board so the selection never references an
/// item that is no longer in the collection.
#[derive(Debug, Default)]
pub struct Board {
    items: OrderedCollection,
    selection: SelectionTracker,
}
impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a board from an already-ordered collection, with nothing
    /// selected.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self> {
        Ok(Self { items: OrderedCollection::from_items(items)?, selection: SelectionTracker::default() })
    }

    pub fn items(&self) -> &OrderedCollection {
        &self.items
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn on_items_changed(&mut self, callback: impl FnMut(&[ItemId]) + Send + 'static) -> Subscription {
        self.items.subscribe(callback)
    }

    pub fn on_selection_changed(&mut self, callback: impl FnMut(&[ItemId]) + Send + 'static) -> Subscription {
        self.selection.subscribe(callback)
    }

    pub fn append(&mut self, item: Item) -> Result<()> {
        self.items.append(item)
    }

    /// Remove an item and drop it from the selection. The caller receives the
    /// item and is responsible for releasing its blob.
    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let item = self.items.remove(id)?;
        self.prune_selection();
        Ok(item)
    }

    /// Remove every item and clear the selection.
    pub fn clear(&mut self) -> Vec<Item> {
        let items = self.items.clear();
        self.selection.reset();
        items
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.items.move_item(from, to)
    }

    pub fn set_display_name(&mut self, id: &str, name: Option<String>) -> Result<()> {
        self.items.set_display_name(id, name)
    }

    /// Toggle the selection of an item that is on the board.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        if !self.items.contains(id) {
            exn::bail!(ErrorKind::UnknownItem(id.to_string()));
        }
        Ok(self.selection.toggle(id))
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    /// Selected items in selection order (not display order).
    pub fn selected_items(&self) -> Vec<&Item> {
        self.selection.ordered_ids().iter().filter_map(|id| self.items.get(id.as_str())).collect()
    }

    /// Start dragging an item.
    pub fn begin_drag(&self, id: &str) -> Result<DragSession> {
        let index = self.items.position(id).ok_or_else(|| exn::Exn::from(ErrorKind::UnknownItem(id.to_string())))?;
        Ok(DragSession::new(ItemId::from(id), index))
    }

    /// Feed a hover event into a drag session, applying the swap if the
    /// session commits one. Returns whether the board changed.
    ///
    /// The dragged item must still be where the session last saw it; a
    /// session outlived by a removal or an unrelated move is rejected with
    /// [`UnknownItem`](ErrorKind::UnknownItem) and the board is left alone.
    pub fn hover(&mut self, drag: &mut DragSession, target: usize, bounds: Bounds, pointer_y: f64) -> Result<bool> {
        if self.items.position(drag.item().as_str()) != Some(drag.index()) {
            exn::bail!(ErrorKind::UnknownItem(drag.item().to_string()));
        }
        if target >= self.items.len() {
            exn::bail!(ErrorKind::IndexOutOfRange { index: target, len: self.items.len() });
        }
        match drag.hover(target, bounds, pointer_y) {
            Some(step) => {
                self.items.move_item(step.from, step.to)?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    fn prune_selection(&mut self) {
        let items = &self.items;
        self.selection.retain(|id| items.contains(id.as_str()));
    }
}
