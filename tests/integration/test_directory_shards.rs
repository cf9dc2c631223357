//! Loading Doxygen-generated shard files from disk through the manifest.

use crate::common::{TestSearchDir, fixture_search_dir};
use doxsearch::shard::SearchManifest;
use doxsearch::{
    DirectorySource, LinkTarget, PartitionKey, Presenter, SearchEngine, SearchError, Settings,
    ShardId, ShardLoader,
};
use std::sync::Arc;

fn engine_for(dir: &TestSearchDir) -> SearchEngine {
    SearchEngine::from_settings(&dir.settings()).expect("engine from fixture settings")
}

#[test]
fn test_manifest_routes_query_to_hex_partition() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);

    let results = engine.search("hse_");
    let names: Vec<&str> = results.items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, vec!["HSE_STARTUP_TIMEOUT", "HSE_VALUE"]);

    // 'h' is position 15 in the manifest, so only all_f was read
    let snapshot = engine.index().snapshot();
    assert_eq!(snapshot.shards(), &[ShardId::new("all_f")]);
    assert_eq!(snapshot.len(), 21);
}

#[test]
fn test_fixture_shard_decodes_labels_and_targets() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);

    let results = engine.search("hardfault");
    assert_eq!(results.len(), 1);
    let item = &results.items[0];
    assert_eq!(item.display_name, "HardFault_Handler");
    assert!(item.grouped);
    assert_eq!(item.links.len(), 2);
    assert_eq!(item.links[0].label, "HardFault_Handler(void):\u{a0}stm32f4xx_it.c");
    assert!(item.links.iter().all(|l| l.target == LinkTarget::Local));

    let setup = engine.search("hardware soft");
    assert_eq!(setup.items[0].display_name, "Hardware & Software Setup");
}

#[test]
fn test_word_entries_match_from_the_middle_of_labels() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);

    let results = engine.search("hz");
    let keys: Vec<&str> = results.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "hz 168000000",
            "hz 8000000",
            "hclk hz 168000000",
            "hse frequency hz 8000000"
        ]
    );
}

#[test]
fn test_corrupt_shard_is_skipped_and_others_survive() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);

    assert_eq!(engine.search("hse_value").len(), 1);

    // 'b' maps to all_9, which is truncated on disk
    let err = engine
        .ensure_shard_loaded(&PartitionKey::new("9"))
        .unwrap_err();
    assert!(matches!(err, SearchError::ShardParse { .. }));

    assert_eq!(engine.search("hse_value").len(), 1);
    assert!(engine.search("bkp").is_empty());

    let failures = engine.loader().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, ShardId::new("all_9"));
}

#[test]
fn test_load_all_reports_failures_and_loads_the_rest() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);

    let summary = engine.loader().ensure_all_loaded().unwrap();
    // all_0 .. all_7 and all_a .. all_e are listed in the manifest but absent
    assert_eq!(summary.loaded, vec![ShardId::new("all_8"), ShardId::new("all_f")]);
    assert_eq!(summary.failed.len(), 14);
    assert!(
        summary
            .failed
            .iter()
            .filter(|(_, e)| matches!(e, SearchError::ShardFetch { .. }))
            .count()
            == 13
    );

    let results = engine.search("value");
    let names: Vec<&str> = results.items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, vec!["APB_VALUE_DIV", "HSE_VALUE", "HSI_VALUE"]);
}

#[test]
fn test_loading_twice_yields_identical_index() {
    let dir = TestSearchDir::from_fixtures();
    let engine = engine_for(&dir);
    let partition = PartitionKey::new("f");

    engine.ensure_shard_loaded(&partition).unwrap();
    let once: Vec<(String, String)> = engine
        .index()
        .snapshot()
        .entries()
        .iter()
        .map(|e| (e.entry.key.clone(), e.entry.display_name.clone()))
        .collect();

    engine.ensure_shard_loaded(&partition).unwrap();
    let twice: Vec<(String, String)> = engine
        .index()
        .snapshot()
        .entries()
        .iter()
        .map(|e| (e.entry.key.clone(), e.entry.display_name.clone()))
        .collect();

    assert_eq!(once, twice);
}

#[test]
fn test_letter_partitions_without_manifest() {
    let dir = TestSearchDir::new();
    dir.add_file(
        "all_h.json",
        r#"[["hse_value", ["HSE_VALUE", ["../group.html#gae", 1, "stm32f4xx.h"]]]]"#,
    );

    let mut settings = dir.settings();
    settings.index.manifest = None;
    settings.display.link_base = Some("docs/html/search".to_string());
    let engine = SearchEngine::from_settings(&settings).unwrap();

    let results = engine.search("hse");
    assert_eq!(results.len(), 1);
    assert_eq!(results.items[0].links[0].url, "docs/html/group.html#gae");
}

#[test]
fn test_default_settings_find_symbols_in_generator_output() {
    let mut settings = Settings::default();
    settings.index.search_dir = fixture_search_dir();
    let engine = SearchEngine::from_settings(&settings).unwrap();

    let results = engine.search("hse");
    assert!(
        results
            .items
            .iter()
            .any(|i| i.display_name == "HSE_VALUE")
    );
    assert!(engine.loader().failures().is_empty());
}

#[test]
fn test_missing_manifest_falls_back_to_key_initials() {
    let dir = TestSearchDir::new();
    dir.add_file(
        "all_h.js",
        "var searchData=[['hse_5fvalue_16',['HSE_VALUE',['../group.html#gae',1,'stm32f4xx.h']]]];",
    );

    let engine = SearchEngine::from_settings(&dir.settings()).unwrap();
    assert!(engine.loader().manifest().is_none());
    assert_eq!(engine.search("hse_v").len(), 1);
}

#[test]
fn test_unreadable_manifest_fails_engine_construction() {
    let dir = TestSearchDir::new();
    dir.add_file("searchdata.js", "var indexSectionsWithContent = {0: 'ab'");
    let err = SearchEngine::from_settings(&dir.settings()).err().unwrap();
    assert!(matches!(err, SearchError::ManifestParse { .. }));
}

#[test]
fn test_fixture_directory_is_usable_in_place() {
    let manifest = SearchManifest::load(fixture_search_dir().join("searchdata.js")).unwrap();
    assert_eq!(manifest.section("defines").unwrap().label, "Macros");

    let loader = ShardLoader::new(Arc::new(DirectorySource::new(fixture_search_dir())), "all")
        .with_manifest(manifest);
    let engine = SearchEngine::new(loader).with_presenter(Presenter::new(None));
    assert_eq!(engine.search("apb1").len(), 1);
}
