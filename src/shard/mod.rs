//! Index shards: payload parsing, manifests, sources and the loader.

pub mod loader;
pub mod manifest;
pub mod payload;
pub mod source;

pub use loader::{LoadOutcome, LoadSummary, ShardLoader};
pub use manifest::{IndexSection, SearchManifest};
pub use payload::{ParsedShard, PayloadFormat, parse_shard};
pub use source::{DirectorySource, MemorySource, ShardSource};
