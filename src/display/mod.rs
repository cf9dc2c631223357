//! Terminal display utilities for search results and shard status.

pub mod tables;
pub mod theme;

pub use tables::{TableBuilder, create_results_table, create_shard_table};
pub use theme::{THEME, Theme};
