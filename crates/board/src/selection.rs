//! Ordered selection of items.
//!
//! The order in which items are *selected* is tracked independently from the
//! order in which they are *displayed*. Reordering the board never touches
//! selection ranks.

use crate::ItemId;
use crate::observer::{Observers, Subscription};
use std::collections::HashMap;

/// Maps selected item ids to their 1-based selection rank.
///
/// Ranks always form the dense range `1..=len()`: deselecting an item closes
/// the gap by shifting every later rank down by one.
///
/// The tracker does not know which ids exist. Toggling an id that is not on
/// the board is accepted here; callers that own the collection (see
/// [`Board::toggle`](crate::Board::toggle)) are expected to prevent it.
///
/// ```
/// use orderly_board::{ItemId, SelectionTracker};
///
/// let mut selection = SelectionTracker::default();
/// selection.toggle("b");
/// selection.toggle("a");
/// selection.toggle("c");
/// selection.toggle("b");
/// assert_eq!(selection.ordered_ids(), ["a", "c"].map(ItemId::from));
/// assert_eq!(selection.rank("c"), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct SelectionTracker {
    ranks: HashMap<ItemId, u32>,
    observers: Observers,
}
impl SelectionTracker {
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ranks.contains_key(id)
    }

    pub fn rank(&self, id: &str) -> Option<u32> {
        self.ranks.get(id).copied()
    }

    /// Selected ids sorted by ascending rank.
    pub fn ordered_ids(&self) -> Vec<ItemId> {
        let mut entries: Vec<_> = self.ranks.iter().collect();
        entries.sort_unstable_by_key(|(_, rank)| **rank);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&[ItemId]) + Send + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    /// Select `id` at the end of the selection order, or deselect it if it
    /// is already selected. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        let selected = match self.ranks.remove(&id) {
            Some(removed) => {
                for rank in self.ranks.values_mut() {
                    if *rank > removed {
                        *rank -= 1;
                    }
                }
                false
            },
            None => {
                let rank = self.ranks.len() as u32 + 1;
                self.ranks.insert(id.clone(), rank);
                true
            },
        };
        tracing::trace!(%id, selected, "Toggled selection");
        self.notify();
        selected
    }

    /// Deselect everything.
    pub fn reset(&mut self) {
        self.ranks.clear();
        self.notify();
    }

    /// Keep only the ids for which `keep` returns `true`, re-compacting the
    /// remaining ranks without changing their relative order. Observers are
    /// only notified when something was actually dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&ItemId) -> bool) -> usize {
        let ordered = self.ordered_ids();
        let before = ordered.len();
        self.ranks = ordered.into_iter().filter(|id| keep(id)).zip(1..).collect();
        let dropped = before - self.ranks.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Pruned stale selection entries");
            self.notify();
        }
        dropped
    }

    fn notify(&mut self) {
        let ids = self.ordered_ids();
        self.observers.notify(&ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    fn snapshot(selection: &SelectionTracker) -> HashMap<ItemId, u32> {
        selection.ranks.clone()
    }

    /// Ranks are exactly `1..=len` with no duplicates or gaps.
    fn assert_dense(selection: &SelectionTracker) {
        let mut ranks: Vec<u32> = selection.ranks.values().copied().collect();
        ranks.sort_unstable();
        let expected: Vec<u32> = (1..=selection.len() as u32).collect();
        assert_eq!(ranks, expected);
    }

    #[rstest]
    #[case(&["a", "b", "c"], &["a", "b", "c"])]
    #[case(&["a", "b", "a"], &["b"])]
    #[case(&["c", "a", "b", "a", "d"], &["c", "b", "d"])]
    #[case(&["a", "b", "c", "b", "b"], &["a", "c", "b"])]
    #[case(&["a", "a"], &[])]
    fn test_toggle_order(#[case] toggles: &[&str], #[case] expected: &[&str]) {
        let mut selection = SelectionTracker::default();
        for id in toggles {
            selection.toggle(*id);
            assert_dense(&selection);
        }
        let expected: Vec<ItemId> = expected.iter().map(|id| ItemId::from(*id)).collect();
        assert_eq!(selection.ordered_ids(), expected);
    }

    #[test]
    fn test_ranks_stay_dense_for_toggle_sequences() {
        let ids = ["a", "b", "c", "d", "e"];
        let mut selection = SelectionTracker::default();
        // Deterministic pseudo-random walk over the ids.
        let mut state = 7u32;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            selection.toggle(ids[(state >> 16) as usize % ids.len()]);
            assert_dense(&selection);
        }
    }

    #[test]
    fn test_double_toggle_of_unselected_restores_map() {
        let mut selection = SelectionTracker::default();
        selection.toggle("a");
        selection.toggle("b");
        let before = snapshot(&selection);
        selection.toggle("c");
        selection.toggle("c");
        assert_eq!(snapshot(&selection), before);
    }

    #[test]
    fn test_double_toggle_of_selected_moves_to_end() {
        let mut selection = SelectionTracker::default();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("c");
        selection.toggle("a");
        selection.toggle("a");
        // Other ranks shift during the round trip; that's accepted behaviour.
        assert_eq!(selection.ordered_ids(), ["b", "c", "a"].map(ItemId::from));
    }

    #[test]
    fn test_reset_notifies_empty() {
        let mut selection = SelectionTracker::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        selection.subscribe(move |ids| sink.lock().unwrap().push(ids.len()));
        selection.toggle("a");
        selection.toggle("b");
        selection.reset();
        assert!(selection.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_retain_compacts_ranks() {
        let mut selection = SelectionTracker::default();
        for id in ["a", "b", "c", "d"] {
            selection.toggle(id);
        }
        assert_eq!(selection.retain(|id| id.as_str() != "b"), 1);
        assert_dense(&selection);
        assert_eq!(selection.ordered_ids(), ["a", "c", "d"].map(ItemId::from));
        assert_eq!(selection.rank("c"), Some(2));
        assert_eq!(selection.retain(|_| true), 0);
    }
}
