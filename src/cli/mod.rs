//! CLI module
//!
//! Command-line interface for paging through a DuckDB relation.
//!
//! # Commands
//!
//! - `page` - Print one page
//! - `walk` - Follow `next` from the first page and summarise every page
//! - `count` - Print the total item count
//! - `validate` - Check the configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
