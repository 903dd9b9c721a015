//! Database group source via DuckDB
//!
//! This module pages through a DuckDB table or query grouped by one column.
//! DuckDB can also attach PostgreSQL, MySQL and SQLite databases, so the same
//! source covers those once the relevant extension is loaded with
//! [`DuckDbSource::execute_batch`].

mod engine;

pub use engine::{DuckDbSource, Record, Relation};
