//! Match engine: substring matching with deterministic ranking.
//!
//! Ranking is a total order over matches:
//!
//! 1. [`MatchKind::Prefix`] before [`MatchKind::Substring`]
//! 2. key, lexicographically
//! 3. insertion ordinal (shard load order, then payload order)
//!
//! Every call is a pure function of the query and the snapshot it is given.

use crate::index::IndexSnapshot;
use crate::types::{EntryOrdinal, IndexedEntry, SymbolEntry};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Key starts with the query
    Prefix,
    /// Query appears later in the key
    Substring,
}

impl MatchKind {
    /// Classify `key` against an already-normalized, non-empty `query`.
    pub fn classify(key: &str, query: &str) -> Option<Self> {
        if key.starts_with(query) {
            Some(MatchKind::Prefix)
        } else if key.contains(query) {
            Some(MatchKind::Substring)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Match {
    pub kind: MatchKind,
    pub ordinal: EntryOrdinal,
    pub entry: Arc<SymbolEntry>,
}

impl Match {
    fn rank(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.entry.key.cmp(&other.entry.key))
            .then_with(|| self.ordinal.cmp(&other.ordinal))
    }
}

/// Ranked matches for one query.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    /// Normalized query the set was computed for
    pub query: String,
    pub matches: Vec<Match>,
    /// Number of matching entries before truncation
    pub total: usize,
    pub truncated: bool,
}

impl MatchSet {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Upper bound on returned matches; 0 disables truncation
    pub max_results: usize,
    /// Index size from which the scan is spread over the rayon pool
    pub parallel_threshold: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            parallel_threshold: 20_000,
        }
    }
}

impl MatchOptions {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

fn to_match(indexed: &IndexedEntry, query: &str) -> Option<Match> {
    MatchKind::classify(&indexed.entry.key, query).map(|kind| Match {
        kind,
        ordinal: indexed.ordinal,
        entry: Arc::clone(&indexed.entry),
    })
}

/// Find and rank every entry whose key contains `query`.
///
/// `query` must already be normalized. An empty query yields an empty set.
pub fn find_matches(snapshot: &IndexSnapshot, query: &str, options: &MatchOptions) -> MatchSet {
    if query.is_empty() {
        return MatchSet::empty(query);
    }

    let entries = snapshot.entries();
    let mut matches: Vec<Match> = if entries.len() >= options.parallel_threshold {
        entries
            .par_iter()
            .filter_map(|e| to_match(e, query))
            .collect()
    } else {
        entries.iter().filter_map(|e| to_match(e, query)).collect()
    };

    let total = matches.len();
    let limit = options.max_results;
    let truncated = limit > 0 && total > limit;

    if truncated {
        matches.select_nth_unstable_by(limit, Match::rank);
        matches.truncate(limit);
    }
    matches.sort_unstable_by(Match::rank);

    tracing::debug!(
        "[match] '{query}': {total} matches over {} entries{}",
        entries.len(),
        if truncated { ", truncated" } else { "" }
    );

    MatchSet {
        query: query.to_string(),
        matches,
        total,
        truncated,
    }
}
