//! Change notification for board state.

use crate::ItemId;

/// Identifies a registered observer so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback = Box<dyn FnMut(&[ItemId]) + Send>;

/// A list of callbacks that receive the full ordered id list after every
/// mutation of the state they observe.
#[derive(Default)]
pub struct Observers {
    next: u64,
    callbacks: Vec<(Subscription, Callback)>,
}
impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut(&[ItemId]) + Send + 'static) -> Subscription {
        let subscription = Subscription(self.next);
        self.next += 1;
        self.callbacks.push((subscription, Box::new(callback)));
        subscription
    }

    /// Returns `false` if the subscription was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(s, _)| *s != subscription);
        before != self.callbacks.len()
    }

    pub(crate) fn notify(&mut self, ids: &[ItemId]) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(ids);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.callbacks.len()).finish()
    }
}
