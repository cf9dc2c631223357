//! Incremental symbol search over generated API documentation.
//!
//! Documentation generators split their symbol index into shards
//! (`<index-name>_<partition>`). This crate loads those shards on demand,
//! merges them into one session index and answers partially typed queries
//! with ranked `(label, link)` results.
//!
//! ```no_run
//! use doxsearch::{SearchEngine, Settings};
//!
//! let engine = SearchEngine::from_settings(&Settings::default())?;
//! for (name, links) in engine.search("hse_").pairs() {
//!     println!("{name}: {links:?}");
//! }
//! # Ok::<(), doxsearch::SearchError>(())
//! ```

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod index;
pub mod io;
pub mod matcher;
pub mod normalize;
pub mod present;
pub mod shard;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use engine::SearchEngine;
pub use error::{SearchError, SearchResult};
pub use index::{IndexSnapshot, MergedIndex};
pub use matcher::{MatchKind, MatchOptions, MatchSet};
pub use normalize::normalize_key;
pub use present::{Presenter, ResultItem, ResultLink, SearchResults};
pub use shard::{DirectorySource, LoadOutcome, MemorySource, ShardLoader, ShardSource};
pub use types::{EntryOrdinal, LinkTarget, Occurrence, PartitionKey, ShardId, SymbolEntry};
