//! Selection-ordered batch renaming.
//!
//! Given the selected items *in selection order* and a [`RuleParameters`], the
//! engine derives a new filename per item. It's a pure function of its inputs
//! plus a creation timestamp; every [`DerivedItem`] from one call shares the
//! same [`GroupKey`].
//!
//! | Mode                         | Name for position `i` of `n`                                    |
//! |------------------------------|-----------------------------------------------------------------|
//! | [`RuleMode::Amazon`]         | `{prefix}.MAIN`, `{prefix}.PT01`…, `{prefix}.SWITCH` (last)      |
//! | [`RuleMode::PrefixIndex`]    | `{prefix}{i+1:02}{suffix}`                                      |
//! | [`RuleMode::CustomSequence`] | `sequence[i]`, then `{last}{overflow}`                          |
//! | [`RuleMode::AiGenerated`]    | `AI-Generated-{i+1:02}`                                         |
//!
//! The source's extension (see [`extension`]) is appended to every name.

mod derived;
mod engine;
pub mod error;
mod extension;
mod mode;
mod params;

pub use crate::derived::{DerivedItem, Group, GroupKey, group_derived};
pub use crate::engine::{Renamer, apply, apply_at, file_name};
pub use crate::extension::extension;
pub use crate::mode::RuleMode;
pub use crate::params::RuleParameters;
