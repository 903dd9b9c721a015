//! Group sequence sources
//!
//! A source is the single boundary between the pager and the backing store.
//!
//! # Overview
//!
//! The source module provides:
//! - `GroupSequenceSource` - Ordered group counts, item ranges and neighbour lookups
//! - `MemorySource` - Reference adapter over an in-memory item list
//!
//! The DuckDB-backed adapter lives in [`crate::database`].

mod memory;
mod traits;

pub use memory::MemorySource;
pub use traits::{GroupCountStream, GroupSequenceSource};
