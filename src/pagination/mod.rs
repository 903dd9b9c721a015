//! Pagination module
//!
//! Lax pagination over grouped, ordered data.
//!
//! # Overview
//!
//! The pagination module provides:
//! - `LaxGroupPaginator` - Picks the run of whole groups that makes up a page
//! - `Page` - Items, boundary keys and per-group counts of one page
//! - `PageWalker` - Follows `next` anchors through the whole data set
//! - `group_adjacent` - Repeatable view of items as runs sharing a key

mod lax;
mod page;
mod types;

pub use lax::{LaxGroupPaginator, PageWalker};
pub use page::{group_adjacent, GroupedItems, Page};
pub use types::{LaxSettings, PageBoundary};

#[cfg(test)]
mod tests;
