//! Core data types shared by the loader, index, matcher and presenter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of one shard file, `<index-name>_<partition>` (e.g. `all_f`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(String);

impl ShardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for `partition` of the index called `index_name`.
    pub fn for_partition(index_name: &str, partition: &PartitionKey) -> Self {
        Self(format!("{index_name}_{}", partition.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the id back into its index name and partition key.
    ///
    /// Index names may themselves contain underscores, so the split happens
    /// at the last one.
    pub fn split(&self) -> Option<(&str, PartitionKey)> {
        let (name, partition) = self.0.rsplit_once('_')?;
        if name.is_empty() || partition.is_empty() {
            return None;
        }
        Some((name, PartitionKey::new(partition)))
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque build-time partition key. The engine never interprets it beyond
/// using it to address a shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-wide insertion position of an entry. Used as the final ranking
/// tie-break so equal keys keep the order in which shards delivered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryOrdinal(pub u64);

impl EntryOrdinal {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// How a documentation link should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkTarget {
    /// Page inside the generated documentation
    #[default]
    Local,
    /// Page from foreign documentation pulled in through a tag file
    External,
}

impl LinkTarget {
    /// Map the integer flag used by the Doxygen payload.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            LinkTarget::External
        } else {
            LinkTarget::Local
        }
    }
}

/// One concrete location where a symbol is documented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub url: String,
    pub container_label: String,
    #[serde(default)]
    pub target: LinkTarget,
}

impl Occurrence {
    pub fn new(url: impl Into<String>, container_label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            container_label: container_label.into(),
            target: LinkTarget::Local,
        }
    }

    pub fn with_target(mut self, target: LinkTarget) -> Self {
        self.target = target;
        self
    }

    /// Page part of the url: the last path segment before any `#anchor`.
    pub fn page_name(&self) -> &str {
        let path = self.url.split('#').next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// The unit of the index: one searchable key with its documented places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub key: String,
    pub display_name: String,
    pub occurrences: Vec<Occurrence>,
    /// Raw producer identifier, kept for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl SymbolEntry {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        occurrences: Vec<Occurrence>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            occurrences,
            source_id: None,
        }
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Identity used for de-duplication across shards.
    pub fn identity(&self) -> (&str, &str) {
        (&self.key, &self.display_name)
    }

    pub fn has_multiple_occurrences(&self) -> bool {
        self.occurrences.len() > 1
    }
}

/// An entry as stored in the merged index.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    pub ordinal: EntryOrdinal,
    pub shard: ShardId,
    pub entry: Arc<SymbolEntry>,
}
