//! The merged, in-memory symbol index.
//!
//! [`MergedIndex`] owns the current [`IndexSnapshot`] behind a lock. Readers
//! clone the `Arc` and work on that snapshot for the whole query; the loader
//! builds the next snapshot off to the side and swaps it in one step per
//! shard. A reader therefore sees a shard either completely or not at all,
//! and an in-flight query is never disturbed by a concurrent load.

use crate::shard::payload::ParsedShard;
use crate::types::{EntryOrdinal, IndexedEntry, ShardId, SymbolEntry};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable view of every shard merged so far.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    /// Entries in insertion order
    entries: Vec<IndexedEntry>,
    /// Exact key lookup: key -> positions in `entries`
    by_key: HashMap<String, Vec<usize>>,
    /// De-duplication: (key, display name) -> position in `entries`
    by_identity: HashMap<(String, String), usize>,
    /// Shards in the order they were merged
    shards: Vec<ShardId>,
    /// What each shard contributed, parallel to `shards`
    reports: Vec<MergeReport>,
    next_ordinal: u64,
}

impl IndexSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    pub fn shards(&self) -> &[ShardId] {
        &self.shards
    }

    pub fn contains_shard(&self, shard: &ShardId) -> bool {
        self.shards.contains(shard)
    }

    /// Entries a shard added and folded when it was merged. Folded entries
    /// live under the shard that introduced them, so counting `entries()`
    /// per shard undercounts later shards.
    pub fn shard_report(&self, shard: &ShardId) -> Option<MergeReport> {
        self.shards
            .iter()
            .position(|s| s == shard)
            .map(|pos| self.reports[pos])
    }

    /// O(1) lookup of every entry whose key equals `key` exactly.
    pub fn lookup(&self, key: &str) -> Vec<&IndexedEntry> {
        self.by_key
            .get(key)
            .map(|positions| positions.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    pub fn occurrence_count(&self) -> usize {
        self.entries.iter().map(|e| e.entry.occurrences.len()).sum()
    }

    fn merge_shard(&mut self, parsed: ParsedShard) -> MergeReport {
        let mut report = MergeReport::default();

        for entry in parsed.entries {
            let identity = (entry.key.clone(), entry.display_name.clone());

            if let Some(&pos) = self.by_identity.get(&identity) {
                let existing = &mut self.entries[pos];
                let mut combined: SymbolEntry = (*existing.entry).clone();
                let before = combined.occurrences.len();
                for occurrence in entry.occurrences {
                    if !combined.occurrences.contains(&occurrence) {
                        combined.occurrences.push(occurrence);
                    }
                }
                if combined.occurrences.len() > before {
                    existing.entry = Arc::new(combined);
                }
                report.merged += 1;
                continue;
            }

            let pos = self.entries.len();
            self.by_key.entry(entry.key.clone()).or_default().push(pos);
            self.by_identity.insert(identity, pos);
            self.entries.push(IndexedEntry {
                ordinal: EntryOrdinal(self.next_ordinal),
                shard: parsed.shard.clone(),
                entry: Arc::new(entry),
            });
            self.next_ordinal += 1;
            report.added += 1;
        }

        self.shards.push(parsed.shard);
        self.reports.push(report);
        report
    }
}

/// What happened when a shard was merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// New entries appended to the index
    pub added: usize,
    /// Entries folded into an existing (key, display name) identity
    pub merged: usize,
}

/// Result of offering a shard to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergeReport),
    AlreadyPresent,
}

/// Append-only, session-wide symbol index.
#[derive(Debug, Default)]
pub struct MergedIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl MergedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn contains_shard(&self, shard: &ShardId) -> bool {
        self.current.read().contains_shard(shard)
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Merge a parsed shard. Inserting a shard that is already present is a
    /// no-op, which makes concurrent loads of the same shard safe.
    pub fn insert_shard(&self, parsed: ParsedShard) -> MergeOutcome {
        let mut current = self.current.write();
        if current.contains_shard(&parsed.shard) {
            return MergeOutcome::AlreadyPresent;
        }

        let mut next = IndexSnapshot::clone(&current);
        let report = next.merge_shard(parsed);
        *current = Arc::new(next);

        MergeOutcome::Merged(report)
    }
}
