// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

//! # grouped-pager
//!
//! Lax pagination over grouped, ordered data (think `GROUP BY` with paging).
//!
//! ## Features
//!
//! - **Groups stay whole**: a group's items always land on the same page
//! - **Lax sizing**: pages aim for `want_per_page` items and may overflow by `lax_threshold`
//! - **Anchored paging**: start from any grouping value, forward or in reverse
//! - **Lazy scans**: only the groups a page needs are counted
//! - **DuckDB source**: page through a table or query grouped by one column
//!
//! ## Quick Start
//!
//! ```rust
//! use grouped_pager::pagination::{LaxGroupPaginator, LaxSettings};
//! use grouped_pager::source::MemorySource;
//!
//! # fn main() -> grouped_pager::Result<()> {
//! let source = MemorySource::from_group_counts([("A", 3), ("B", 10), ("C", 2), ("D", 1)]);
//! let paginator = LaxGroupPaginator::new(source, LaxSettings::new(5, 0.5))?;
//!
//! let page = paginator.page(None)?;
//! assert_eq!(page.len(), 3);
//! assert_eq!(page.next_anchor(), Some(&"B"));
//!
//! let page = paginator.page(page.next_anchor().copied())?;
//! assert_eq!(page.len(), 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LaxGroupPaginator                        │
//! │  page(anchor) → Page { items, boundary, group_counts }      │
//! │  walk(anchor) → Iterator<Page>                              │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                   ┌───────────┴───────────┐
//!                   │  GroupSequenceSource  │
//!                   ├───────────┬───────────┤
//!                   │  Memory   │  DuckDB   │
//!                   └───────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Group sequence sources
pub mod source;

/// Lax grouped pagination
pub mod pagination;

/// DuckDB-backed group source
pub mod database;

/// Anchor tokens
pub mod anchor;

/// Configuration file
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use pagination::{LaxGroupPaginator, LaxSettings, Page, PageBoundary};
pub use source::{GroupSequenceSource, MemorySource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
