//! Shard loader: fetches shard payloads on demand and merges them into the
//! session's [`MergedIndex`].
//!
//! Loading is idempotent per shard. A shard that fails to fetch or parse is
//! recorded in the failure ledger and never touches the index, so shards
//! merged earlier stay searchable.

use crate::error::{SearchError, SearchResult};
use crate::index::{MergeOutcome, MergedIndex};
use crate::shard::manifest::SearchManifest;
use crate::shard::payload::{ParsedShard, parse_shard};
use crate::shard::source::ShardSource;
use crate::types::{PartitionKey, ShardId};
use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Result of asking for a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        /// New entries added to the index
        entries: usize,
        /// Entries folded into existing identities
        merged: usize,
        /// Entries dropped for having no searchable key
        skipped: usize,
    },
    AlreadyLoaded,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Aggregate of a bulk load.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: Vec<ShardId>,
    pub already_loaded: usize,
    pub failed: Vec<(ShardId, SearchError)>,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ShardLoader {
    source: Arc<dyn ShardSource>,
    index: Arc<MergedIndex>,
    index_name: String,
    manifest: Option<SearchManifest>,
    failures: DashMap<ShardId, String>,
}

impl ShardLoader {
    pub fn new(source: Arc<dyn ShardSource>, index_name: impl Into<String>) -> Self {
        Self {
            source,
            index: Arc::new(MergedIndex::new()),
            index_name: index_name.into(),
            manifest: None,
            failures: DashMap::new(),
        }
    }

    /// Merge into an existing index instead of a fresh one.
    pub fn with_index(mut self, index: Arc<MergedIndex>) -> Self {
        self.index = index;
        self
    }

    /// Address shards through a section manifest.
    pub fn with_manifest(mut self, manifest: SearchManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn index(&self) -> &Arc<MergedIndex> {
        &self.index
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn manifest(&self) -> Option<&SearchManifest> {
        self.manifest.as_ref()
    }

    pub fn source(&self) -> &dyn ShardSource {
        self.source.as_ref()
    }

    pub fn shard_for(&self, partition: &PartitionKey) -> ShardId {
        ShardId::for_partition(&self.index_name, partition)
    }

    /// Partition that holds keys starting like `normalized_query`.
    ///
    /// With a manifest this is the hex position of the first character in
    /// the section's list; without one it is the character itself. `None`
    /// means no shard can contain a prefix match.
    pub fn partition_for_query(&self, normalized_query: &str) -> Option<PartitionKey> {
        let first = normalized_query.chars().next()?;
        match &self.manifest {
            Some(manifest) => manifest
                .section(&self.index_name)
                .and_then(|section| section.partition_for(first)),
            None => Some(PartitionKey::new(first.to_string())),
        }
    }

    /// Ensure the shard for `partition` is merged into the index.
    pub fn ensure_shard_loaded(&self, partition: &PartitionKey) -> SearchResult<LoadOutcome> {
        let shard = self.shard_for(partition);
        self.load_shard(&shard)
    }

    /// Ensure the shard with the given id is merged into the index.
    pub fn load_shard(&self, shard: &ShardId) -> SearchResult<LoadOutcome> {
        if self.index.contains_shard(shard) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let parsed = self.fetch_and_parse(shard)?;
        Ok(self.merge(parsed))
    }

    /// Load the partition a query needs. Returns `Ok(None)` when no shard
    /// exists for it.
    pub fn ensure_for_query(&self, normalized_query: &str) -> SearchResult<Option<LoadOutcome>> {
        match self.partition_for_query(normalized_query) {
            Some(partition) => self.ensure_shard_loaded(&partition).map(Some),
            None => Ok(None),
        }
    }

    /// Every shard of this index the manifest or source knows about.
    pub fn known_shards(&self) -> SearchResult<Vec<ShardId>> {
        if let Some(section) = self
            .manifest
            .as_ref()
            .and_then(|m| m.section(&self.index_name))
        {
            return Ok(section.shard_ids());
        }

        let shards = self
            .source
            .list()?
            .into_iter()
            .filter(|id| id.split().is_some_and(|(name, _)| name == self.index_name))
            .collect();
        Ok(shards)
    }

    /// Load every known shard. Payloads are fetched and parsed in parallel,
    /// then merged one by one in shard order so entry ordinals do not depend
    /// on thread timing.
    pub fn ensure_all_loaded(&self) -> SearchResult<LoadSummary> {
        let start = Instant::now();
        let shards = self.known_shards()?;

        let mut summary = LoadSummary::default();
        let pending: Vec<&ShardId> = shards
            .iter()
            .filter(|s| {
                let loaded = self.index.contains_shard(s);
                if loaded {
                    summary.already_loaded += 1;
                }
                !loaded
            })
            .collect();

        let fetched: Vec<(&ShardId, SearchResult<ParsedShard>)> = pending
            .par_iter()
            .map(|&shard| (shard, self.fetch_and_parse(shard)))
            .collect();

        for (shard, result) in fetched {
            match result {
                Ok(parsed) => match self.merge(parsed) {
                    LoadOutcome::Loaded { .. } => summary.loaded.push(shard.clone()),
                    LoadOutcome::AlreadyLoaded => summary.already_loaded += 1,
                },
                Err(e) => summary.failed.push((shard.clone(), e)),
            }
        }

        tracing::info!(
            "[loader] {} shards loaded, {} already present, {} failed in {:?}",
            summary.loaded.len(),
            summary.already_loaded,
            summary.failed.len(),
            start.elapsed()
        );
        Ok(summary)
    }

    /// Shards whose last load attempt failed, with the reason.
    pub fn failures(&self) -> Vec<(ShardId, String)> {
        let mut failures: Vec<(ShardId, String)> = self
            .failures
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        failures.sort();
        failures
    }

    fn fetch_and_parse(&self, shard: &ShardId) -> SearchResult<ParsedShard> {
        let result = self
            .source
            .fetch(shard)
            .and_then(|text| parse_shard(shard, &text));

        match &result {
            Ok(parsed) => {
                self.failures.remove(shard);
                tracing::debug!(
                    "[loader] parsed {shard}: {} entries, {} skipped",
                    parsed.entries.len(),
                    parsed.skipped
                );
            }
            Err(e) => {
                tracing::warn!("[loader] skipping shard {shard}: {e}");
                self.failures.insert(shard.clone(), e.to_string());
            }
        }
        result
    }

    fn merge(&self, parsed: ParsedShard) -> LoadOutcome {
        let shard = parsed.shard.clone();
        let skipped = parsed.skipped;
        match self.index.insert_shard(parsed) {
            MergeOutcome::Merged(report) => {
                tracing::debug!(
                    "[loader] merged {shard}: {} new, {} folded",
                    report.added,
                    report.merged
                );
                LoadOutcome::Loaded {
                    entries: report.added,
                    merged: report.merged,
                    skipped,
                }
            }
            MergeOutcome::AlreadyPresent => LoadOutcome::AlreadyLoaded,
        }
    }
}
