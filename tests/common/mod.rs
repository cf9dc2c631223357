#![allow(dead_code)]

use doxsearch::{MemorySource, SearchEngine, Settings, ShardLoader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Directory with Doxygen-generated search shards checked into the repo.
pub fn fixture_search_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doxygen_search")
}

/// A throwaway `search/` directory that tests can write shards into.
pub struct TestSearchDir {
    pub dir: TempDir,
}

impl TestSearchDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Copy every fixture shard into the temp directory.
    pub fn from_fixtures() -> Self {
        let project = Self::new();
        for entry in fs::read_dir(fixture_search_dir()).expect("Fixture dir missing") {
            let path = entry.expect("Failed to read fixture entry").path();
            let name = path.file_name().expect("Fixture without name");
            fs::copy(&path, project.path().join(name)).expect("Failed to copy fixture");
        }
        project
    }

    pub fn add_file(&self, name: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(name);
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default settings pointing at this directory.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.index.search_dir = self.path().to_path_buf();
        settings
    }
}

/// Engine over in-memory shards keyed by shard id.
pub fn memory_engine(shards: &[(&str, &str)]) -> SearchEngine {
    let source = shards
        .iter()
        .fold(MemorySource::new(), |source, (id, payload)| {
            source.with_shard(*id, *payload)
        });
    SearchEngine::new(ShardLoader::new(Arc::new(source), "all"))
}
