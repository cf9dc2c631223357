//! Where shard payloads come from.

use crate::error::{SearchError, SearchResult};
use crate::types::ShardId;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies raw shard payloads by id.
pub trait ShardSource: Send + Sync {
    /// Fetch the raw payload text for `shard`.
    fn fetch(&self, shard: &ShardId) -> SearchResult<String>;

    /// Enumerate the shards this source can provide.
    fn list(&self) -> SearchResult<Vec<ShardId>>;

    /// Short description for logs and status output.
    fn describe(&self) -> String;
}

/// Extensions tried, in order, when resolving a shard file.
const SHARD_EXTENSIONS: [&str; 2] = ["js", "json"];

/// Reads shards from a generated `search/` directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, shard: &ShardId) -> impl Iterator<Item = PathBuf> + '_ {
        let name = shard.as_str().to_string();
        SHARD_EXTENSIONS
            .iter()
            .map(move |ext| self.root.join(format!("{name}.{ext}")))
    }
}

impl ShardSource for DirectorySource {
    fn fetch(&self, shard: &ShardId) -> SearchResult<String> {
        for path in self.candidates(shard) {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!("[source] read {} ({} bytes)", path.display(), text.len());
                    return Ok(text);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(SearchError::ShardFetch {
                        shard: shard.clone(),
                        source,
                    });
                }
            }
        }

        Err(SearchError::ShardFetch {
            shard: shard.clone(),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {}.js or .json in {}", shard, self.root.display()),
            ),
        })
    }

    fn list(&self) -> SearchResult<Vec<ShardId>> {
        let read_dir = std::fs::read_dir(&self.root).map_err(|e| {
            SearchError::General(format!(
                "Cannot list shards in '{}': {e}",
                self.root.display()
            ))
        })?;

        let mut shards = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            let is_shard_file = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SHARD_EXTENSIONS.contains(&e));
            if !is_shard_file {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let id = ShardId::new(stem);
                if id.split().is_some() && !shards.contains(&id) {
                    shards.push(id);
                }
            }
        }
        shards.sort();
        Ok(shards)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Holds shard payloads in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    payloads: RwLock<BTreeMap<ShardId, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shard(self, shard: impl Into<String>, payload: impl Into<String>) -> Self {
        self.insert(ShardId::new(shard), payload);
        self
    }

    pub fn insert(&self, shard: ShardId, payload: impl Into<String>) {
        self.payloads.write().insert(shard, payload.into());
    }
}

impl ShardSource for MemorySource {
    fn fetch(&self, shard: &ShardId) -> SearchResult<String> {
        self.payloads
            .read()
            .get(shard)
            .cloned()
            .ok_or_else(|| SearchError::UnknownShard {
                shard: shard.clone(),
            })
    }

    fn list(&self) -> SearchResult<Vec<ShardId>> {
        Ok(self.payloads.read().keys().cloned().collect())
    }

    fn describe(&self) -> String {
        format!("memory ({} shards)", self.payloads.read().len())
    }
}
