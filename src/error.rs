//! Error types for the documentation search engine
//!
//! This module provides structured error types using thiserror. An empty
//! or non-matching query is never an error; only shard acquisition,
//! manifest and configuration problems are.

use crate::types::ShardId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading and searching
#[derive(Error, Debug)]
pub enum SearchError {
    /// Malformed shard payload. The shard is skipped, others stay usable.
    #[error("Failed to parse shard '{shard}': {reason}")]
    ShardParse { shard: ShardId, reason: String },

    /// Transient storage failure while obtaining a shard payload
    #[error("Failed to fetch shard '{shard}': {source}")]
    ShardFetch {
        shard: ShardId,
        source: std::io::Error,
    },

    #[error("Failed to parse search manifest '{path}': {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Shard '{shard}' is not provided by this source")]
    UnknownShard { shard: ShardId },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl SearchError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::ShardParse { .. } => "SHARD_PARSE_ERROR",
            Self::ShardFetch { .. } => "SHARD_FETCH_ERROR",
            Self::ManifestParse { .. } => "MANIFEST_PARSE_ERROR",
            Self::UnknownShard { .. } => "UNKNOWN_SHARD",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::ShardParse { .. } => vec![
                "Regenerate the documentation so the search shards are rewritten",
                "Other shards remain searchable, results may be incomplete",
            ],
            Self::ShardFetch { .. } => vec![
                "Check that index.search_dir points at the generated search/ directory",
                "The failure may be transient, retry the search",
            ],
            Self::ManifestParse { .. } => vec![
                "Remove index.manifest from the settings to fall back to letter partitions",
            ],
            Self::UnknownShard { .. } => {
                vec!["Run 'doxsearch shards' to list the shards that exist"]
            }
            Self::ConfigError { .. } => vec![
                "Run 'doxsearch init --force' to regenerate the settings file",
            ],
            Self::General(_) => vec![],
        }
    }

    /// Whether a retry of the same operation can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ShardFetch { .. })
    }
}

/// Result type alias for search and loading operations
pub type SearchResult<T> = Result<T, SearchError>;
