//! Search engine façade: normalizer → loader → matcher → presenter.

use crate::config::Settings;
use crate::error::SearchResult;
use crate::index::MergedIndex;
use crate::matcher::{MatchOptions, MatchSet, find_matches};
use crate::normalize::normalize_key;
use crate::present::{Presenter, SearchResults};
use crate::shard::loader::{LoadOutcome, ShardLoader};
use crate::shard::manifest::SearchManifest;
use crate::shard::source::DirectorySource;
use crate::types::{PartitionKey, SymbolEntry};
use std::sync::Arc;

pub struct SearchEngine {
    loader: ShardLoader,
    presenter: Presenter,
    options: MatchOptions,
    lazy_load: bool,
}

impl SearchEngine {
    pub fn new(loader: ShardLoader) -> Self {
        Self {
            loader,
            presenter: Presenter::default(),
            options: MatchOptions::default(),
            lazy_load: true,
        }
    }

    /// Build an engine reading shards from `settings.index.search_dir`.
    ///
    /// A configured manifest that is not on disk is not an error; an
    /// unreadable one is.
    pub fn from_settings(settings: &Settings) -> SearchResult<Self> {
        let source = Arc::new(DirectorySource::new(&settings.index.search_dir));
        let mut loader = ShardLoader::new(source, settings.index.index_name.clone());

        match settings.manifest_path() {
            Some(path) if path.is_file() => {
                loader = loader.with_manifest(SearchManifest::load(&path)?);
            }
            Some(path) => {
                tracing::debug!(
                    "[engine] no manifest at {}, addressing shards by key initial",
                    path.display()
                );
            }
            None => {}
        }

        Ok(Self::new(loader)
            .with_options(settings.search.match_options())
            .with_lazy_load(settings.search.lazy_load)
            .with_presenter(Presenter::new(settings.display.link_base.clone())))
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_lazy_load(mut self, lazy_load: bool) -> Self {
        self.lazy_load = lazy_load;
        self
    }

    pub fn with_presenter(mut self, presenter: Presenter) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn loader(&self) -> &ShardLoader {
        &self.loader
    }

    pub fn index(&self) -> &Arc<MergedIndex> {
        self.loader.index()
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn ensure_shard_loaded(&self, partition: &PartitionKey) -> SearchResult<LoadOutcome> {
        self.loader.ensure_shard_loaded(partition)
    }

    /// Search with the configured result bound.
    pub fn search(&self, raw_query: &str) -> SearchResults {
        self.search_with_limit(raw_query, self.options.max_results)
    }

    /// Search with an explicit result bound (0 = unlimited).
    pub fn search_with_limit(&self, raw_query: &str, max_results: usize) -> SearchResults {
        let options = self.options.with_max_results(max_results);
        let set = self.match_query(raw_query, &options);
        self.presenter.present(&set)
    }

    /// Ranked matches before presentation.
    ///
    /// A failed lazy load is logged and the query runs against whatever is
    /// already merged.
    pub fn match_query(&self, raw_query: &str, options: &MatchOptions) -> MatchSet {
        let query = normalize_key(raw_query);
        if query.is_empty() {
            return MatchSet::empty(query);
        }

        if self.lazy_load {
            if let Err(e) = self.loader.ensure_for_query(&query) {
                tracing::warn!("[engine] searching without shard for '{query}': {e}");
            }
        }

        let snapshot = self.loader.index().snapshot();
        find_matches(&snapshot, &query, options)
    }

    /// Entries whose key equals the normalized query exactly.
    pub fn lookup_exact(&self, raw_key: &str) -> Vec<SymbolEntry> {
        let key = normalize_key(raw_key);
        if key.is_empty() {
            return Vec::new();
        }

        if self.lazy_load {
            if let Err(e) = self.loader.ensure_for_query(&key) {
                tracing::warn!("[engine] exact lookup without shard for '{key}': {e}");
            }
        }

        let snapshot = self.loader.index().snapshot();
        snapshot
            .lookup(&key)
            .into_iter()
            .map(|indexed| SymbolEntry::clone(&indexed.entry))
            .collect()
    }
}
