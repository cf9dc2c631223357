//! Settings written by `init` and edited by hand drive the engine.

use crate::common::TestSearchDir;
use doxsearch::{SearchEngine, Settings};
use std::fs;

#[test]
fn test_init_template_then_point_at_fixtures() {
    let project = tempfile::TempDir::new().expect("Failed to create temp dir");
    let shards = TestSearchDir::from_fixtures();

    let path = Settings::init_config_file(project.path(), false).unwrap();
    assert!(path.ends_with(".doxsearch/settings.toml"));
    assert!(Settings::init_config_file(project.path(), false).is_err());

    let template = fs::read_to_string(&path).unwrap();
    let edited = template
        .replace(
            "search_dir = \"docs/html/search\"",
            &format!("search_dir = {:?}", shards.path().display().to_string()),
        )
        .replace("max_results = 50", "max_results = 1");
    fs::write(&path, edited).unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.search.max_results, 1);
    assert_eq!(settings.index.manifest.as_deref(), Some("searchdata.js"));
    assert_eq!(settings.index.search_dir, shards.path());

    let engine = SearchEngine::from_settings(&settings).unwrap();
    let results = engine.search("hse");
    assert_eq!(results.len(), 1);
    assert_eq!(results.total, 4);
    assert!(results.truncated);
}

#[test]
fn test_lazy_load_disabled_searches_only_loaded_shards() {
    let shards = TestSearchDir::from_fixtures();
    let mut settings = shards.settings();
    settings.search.lazy_load = false;

    let engine = SearchEngine::from_settings(&settings).unwrap();
    assert!(engine.search("hse").is_empty());
    assert!(engine.index().is_empty());

    engine.loader().ensure_all_loaded().unwrap();
    assert_eq!(engine.search("hse").len(), 4);
}
