//! Section manifest (`searchdata.js`).
//!
//! The documentation producer writes one manifest next to the shards. It
//! lists, per index section, the section name used in shard file names and
//! the characters that have a shard. The shard for a character is addressed
//! by the hex position of that character in the list:
//!
//! ```text
//! var indexSectionsWithContent = { 0: "_abcdefgh" };
//! var indexSectionNames = { 0: "all" };
//! ```
//!
//! Here `h` lives in `all_8`.

use crate::error::{SearchError, SearchResult};
use crate::shard::payload::{parse_literal, script_declarations};
use crate::types::{PartitionKey, ShardId};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Bare numeric object keys (`{0: "all"}`), which JSON5 does not accept.
static NUMERIC_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)(\d+)(\s*:)").expect("Invalid regex"));

/// One section of the manifest, e.g. "all", "functions" or "files".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSection {
    pub id: u32,
    pub name: String,
    pub label: String,
    pub initials: Vec<char>,
}

impl IndexSection {
    /// Partition holding keys that start with `initial`, if the section has one.
    pub fn partition_for(&self, initial: char) -> Option<PartitionKey> {
        let lowered = initial.to_lowercase().next().unwrap_or(initial);
        self.initials
            .iter()
            .position(|&c| c == lowered)
            .map(|pos| PartitionKey::new(format!("{pos:x}")))
    }

    pub fn partitions(&self) -> Vec<PartitionKey> {
        (0..self.initials.len())
            .map(|pos| PartitionKey::new(format!("{pos:x}")))
            .collect()
    }

    pub fn shard_ids(&self) -> Vec<ShardId> {
        self.partitions()
            .iter()
            .map(|p| ShardId::for_partition(&self.name, p))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchManifest {
    sections: Vec<IndexSection>,
}

impl SearchManifest {
    pub fn load(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SearchError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: impl Into<PathBuf>) -> SearchResult<Self> {
        let origin = origin.into();
        let fail = |reason: String| SearchError::ManifestParse {
            path: origin.clone(),
            reason,
        };

        let vars = read_script_vars(text).map_err(&fail)?;

        let contents = vars
            .get("indexSectionsWithContent")
            .ok_or_else(|| fail("missing indexSectionsWithContent".to_string()))?;
        let names = vars
            .get("indexSectionNames")
            .ok_or_else(|| fail("missing indexSectionNames".to_string()))?;
        let labels = vars.get("indexSectionLabels");

        let contents = numbered_strings(contents).map_err(&fail)?;
        let names = numbered_strings(names).map_err(&fail)?;
        let labels = match labels {
            Some(value) => numbered_strings(value).map_err(&fail)?,
            None => BTreeMap::new(),
        };

        let mut sections = Vec::with_capacity(names.len());
        for (id, name) in names {
            let initials = contents
                .get(&id)
                .map(|chars| chars.chars().collect())
                .unwrap_or_default();
            let label = labels.get(&id).cloned().unwrap_or_else(|| name.clone());
            sections.push(IndexSection {
                id,
                name,
                label,
                initials,
            });
        }

        tracing::debug!(
            "[manifest] {} sections from {}",
            sections.len(),
            origin.display()
        );
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[IndexSection] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&IndexSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Collect `var name = <literal>;` declarations from a script.
fn read_script_vars(text: &str) -> Result<BTreeMap<String, Value>, String> {
    script_declarations(text)
        .into_iter()
        .map(|(name, literal)| {
            let quoted = NUMERIC_KEY.replace_all(literal, "$1\"$2\"$3");
            let value = parse_literal(&quoted).map_err(|e| format!("in '{name}': {e}"))?;
            Ok((name.to_string(), value))
        })
        .collect()
}

/// Read an object like `{ 0: "all", 1: "classes" }` into id-ordered strings.
fn numbered_strings(value: &Value) -> Result<BTreeMap<u32, String>, String> {
    let map = value
        .as_object()
        .ok_or_else(|| "expected an object of numbered strings".to_string())?;

    map.iter()
        .map(|(k, v)| {
            let id = k
                .parse::<u32>()
                .map_err(|_| format!("section id '{k}' is not a number"))?;
            let text = v
                .as_str()
                .ok_or_else(|| format!("section {id} is not a string"))?;
            Ok((id, text.to_string()))
        })
        .collect()
}
