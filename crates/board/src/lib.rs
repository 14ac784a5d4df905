//! The image board: an ordered collection of items, drag-driven reordering
//! and an ordered selection.
//!
//! Everything in this crate is synchronous and performs no I/O. State changes
//! are announced to observers registered through [`Board::on_items_changed`]
//! and [`Board::on_selection_changed`] (or directly on the
//! [`OrderedCollection`] / [`SelectionTracker`]), each receiving the full
//! ordered id list after every mutation.
//!
//! ```
//! use orderly_board::{Board, Item};
//!
//! let mut board = Board::new();
//! for (id, name) in [("1", "front.jpg"), ("2", "back.jpg"), ("3", "side.jpg")] {
//!     board.append(Item::new(id, name, 0, "image/jpeg")).unwrap();
//! }
//! board.toggle("2").unwrap();
//! board.toggle("1").unwrap();
//! board.move_item(0, 2).unwrap();
//!
//! let names: Vec<_> = board.selected_items().iter().map(|item| item.name()).collect();
//! assert_eq!(names, ["back.jpg", "front.jpg"]);
//! ```

mod board;
mod collection;
mod drag;
pub mod error;
mod item;
mod observer;
mod selection;

pub use crate::board::Board;
pub use crate::collection::OrderedCollection;
pub use crate::drag::{Bounds, DragSession, Move};
pub use crate::item::{BlobRef, Item, ItemId};
pub use crate::observer::{Observers, Subscription};
pub use crate::selection::SelectionTracker;
