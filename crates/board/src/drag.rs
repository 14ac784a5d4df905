//! Pointer-drag reordering.
//!
//! A [`DragSession`] follows one dragged item while the pointer hovers over
//! other items. A swap is only committed once the pointer has crossed the
//! vertical midpoint of the hovered item *in the direction of the drag*; this
//! stops the two items from swapping back and forth while the pointer sits
//! near the boundary.

use crate::ItemId;

/// Vertical extent of a hovered item, in the same coordinate space as the
/// pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
}
impl Bounds {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + (self.bottom - self.top) / 2.0
    }
}

/// A swap the drag session wants committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// Tracks the current index of the item being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    item: ItemId,
    index: usize,
}
impl DragSession {
    pub fn new(item: ItemId, index: usize) -> Self {
        Self { item, index }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    /// Where the dragged item currently sits.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Decide whether hovering at `pointer_y` over the item at `target`
    /// (occupying `bounds`) should commit a swap.
    ///
    /// - Dragging downwards (`target` after the dragged item) commits only
    ///   once the pointer is below the target's midpoint.
    /// - Dragging upwards commits only once the pointer is above it.
    ///
    /// On commit the session assumes the swap is applied and continues from
    /// `target`.
    ///
    /// ```
    /// use orderly_board::{Bounds, DragSession, Move};
    ///
    /// let mut drag = DragSession::new("a".into(), 0);
    /// let second_row = Bounds::new(100.0, 200.0);
    /// assert_eq!(drag.hover(1, second_row, 120.0), None);
    /// assert_eq!(drag.hover(1, second_row, 160.0), Some(Move { from: 0, to: 1 }));
    /// assert_eq!(drag.index(), 1);
    /// ```
    pub fn hover(&mut self, target: usize, bounds: Bounds, pointer_y: f64) -> Option<Move> {
        if target == self.index {
            return None;
        }
        let midpoint = bounds.midpoint();
        let downwards = self.index < target;
        if downwards && pointer_y < midpoint {
            return None;
        }
        if !downwards && pointer_y > midpoint {
            return None;
        }
        let step = Move { from: self.index, to: target };
        self.index = target;
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROW: Bounds = Bounds { top: 100.0, bottom: 200.0 };

    #[rstest]
    // Dragging down onto index 2
    #[case(1, 2, 110.0, None)]
    #[case(1, 2, 149.0, None)]
    #[case(1, 2, 151.0, Some(Move { from: 1, to: 2 }))]
    #[case(1, 2, 199.0, Some(Move { from: 1, to: 2 }))]
    // Dragging up onto index 0
    #[case(1, 0, 190.0, None)]
    #[case(1, 0, 151.0, None)]
    #[case(1, 0, 149.0, Some(Move { from: 1, to: 0 }))]
    #[case(1, 0, 101.0, Some(Move { from: 1, to: 0 }))]
    // Hovering over itself
    #[case(1, 1, 120.0, None)]
    fn test_hover(#[case] from: usize, #[case] target: usize, #[case] pointer: f64, #[case] expected: Option<Move>) {
        let mut drag = DragSession::new("x".into(), from);
        assert_eq!(drag.hover(target, ROW, pointer), expected);
        let index = expected.map(|m| m.to).unwrap_or(from);
        assert_eq!(drag.index(), index);
    }

    #[test]
    fn test_no_oscillation_near_midpoint() {
        let mut drag = DragSession::new("x".into(), 0);
        // Cross downward once: swap.
        assert!(drag.hover(1, ROW, 155.0).is_some());
        // Pointer wobbles around the midpoint of what is now the item at
        // index 1 (the dragged item itself): nothing happens.
        assert!(drag.hover(1, ROW, 145.0).is_none());
        assert!(drag.hover(1, ROW, 155.0).is_none());
        // The displaced item now sits at index 0, above the drag. Moving back
        // up only triggers once above its midpoint.
        let above = Bounds::new(0.0, 100.0);
        assert!(drag.hover(0, above, 60.0).is_none());
        assert_eq!(drag.hover(0, above, 40.0), Some(Move { from: 1, to: 0 }));
    }
}
