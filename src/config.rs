//! Configuration module for the documentation search engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `DS_` and use double underscores
//! to separate nested levels:
//! - `DS_SEARCH__MAX_RESULTS=20` sets `search.max_results`
//! - `DS_INDEX__SEARCH_DIR=build/html/search` sets `index.search_dir`
//! - `DS_SEARCH__LAZY_LOAD=false` sets `search.lazy_load`

use crate::matcher::MatchOptions;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory holding the settings file, searched for from the current
/// directory upwards.
pub const CONFIG_DIR: &str = ".doxsearch";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Where the index shards live and how they are named
    #[serde(default)]
    pub index: IndexConfig,

    /// Matching and truncation
    #[serde(default)]
    pub search: SearchConfig,

    /// How results are rendered
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexConfig {
    /// Directory containing the shard files
    #[serde(default = "default_search_dir")]
    pub search_dir: PathBuf,

    /// Index name, the `<index-name>` part of `<index-name>_<partition>`
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Manifest file inside `search_dir`. When it is unset, empty or missing
    /// on disk, partitions are the first character of the key.
    #[serde(default = "default_manifest", skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Maximum number of results returned (0 = unlimited)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Load only the shard the query's first character lives in
    #[serde(default = "default_true")]
    pub lazy_load: bool,

    /// Index size from which matching runs on the rayon pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DisplayConfig {
    /// Location of the shard directory as seen by whoever follows the links.
    /// Shard urls are resolved against it; unset leaves them untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_base: Option<String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_true() -> bool {
    true
}
fn default_search_dir() -> PathBuf {
    PathBuf::from("docs/html/search")
}
fn default_index_name() -> String {
    "all".to_string()
}
fn default_manifest() -> Option<String> {
    Some("searchdata.js".to_string())
}
fn default_max_results() -> usize {
    50
}
fn default_parallel_threshold() -> usize {
    20_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            index: IndexConfig::default(),
            search: SearchConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            search_dir: default_search_dir(),
            index_name: default_index_name(),
            manifest: default_manifest(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            lazy_load: true,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl SearchConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            max_results: self.max_results,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore
            // stays part of the field name
            .merge(Env::prefixed("DS_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("DS_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for the config directory from the
    /// current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Path of the manifest, if one is configured
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.index
            .manifest
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(|name| self.index.search_dir.join(name))
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(
        dir: impl AsRef<std::path::Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# doxsearch configuration

# Version of the configuration schema
version = 1

# Global debug mode
debug = false

[index]
# Directory with the generated search shards (<index-name>_<partition>.js)
search_dir = "docs/html/search"

# Index to search; "all" covers every documented symbol
index_name = "all"

# Section manifest written next to the shards. Set to "" (or leave the file
# out) to address shards by the first character of their keys (all_h.js).
manifest = "searchdata.js"

[search]
# Maximum number of results returned (0 = unlimited)
max_results = 50

# Load only the shard the query's first character lives in.
# Substring matches from other shards appear once those shards are loaded.
lazy_load = true

# Index size from which matching is spread across threads
parallel_threshold = 20000

[display]
# Resolve result links against this location (the shard directory as seen
# by whoever opens the links). Leave unset to print links as stored.
# link_base = "docs/html/search"
"#;

        std::fs::write(&config_path, template)?;
        tracing::info!("[config] wrote {}", config_path.display());

        Ok(config_path)
    }
}
