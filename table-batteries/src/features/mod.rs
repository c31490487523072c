//! The independent table features.
//!
//! Each feature pairs a `*Config` (declared once per table, with an
//! `is_enabled` flag) and a state type. States never reach into each other;
//! cross-feature rules live in [`TableState`](crate::TableState).

mod active_item;
mod expansion;
mod filter;
mod pagination;
mod selection;
mod sort;

pub use active_item::*;
pub use expansion::*;
pub use filter::*;
pub use pagination::*;
pub use selection::*;
pub use sort::*;
