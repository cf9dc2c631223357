//! Search behaviour over realistic shards: ranking, self-match, empty
//! queries, truncation and grouping.

use crate::common::memory_engine;
use doxsearch::{MatchKind, PartitionKey};

const SHARD_H: &str = r#"var searchData=
[
  ['hse_13',['System Clock source                    | PLL (HSE)',['../system__stm32f4xx_8c.html#autotoc_md2',1,'']]],
  ['hse_5fstartup_5ftimeout_15',['HSE_STARTUP_TIMEOUT',['../group___library__configuration__section.html#ga68ecbc9b0a1a40a1ec9d18d5e9747c4f',1,'stm32f4xx.h']]],
  ['hse_5fvalue_16',['HSE_VALUE',['../group___library__configuration__section.html#gaeafcff4f57440c60e64812dddd13e7cb',1,'stm32f4xx.h']]],
  ['hsi_5fvalue_17',['HSI_VALUE',['../group___library__configuration__section.html#gaaa8c76e274d0f6dd2cefb5d0b17fbc37',1,'stm32f4xx.h']]],
  ['hz_20168000000_19',['Hz 168000000',['../system__stm32f4xx_8c.html#autotoc_md4',1,'HCLK(Hz)                               | 168000000'],['../system__stm32f4xx_8c.html#autotoc_md3',1,'SYSCLK(Hz)                             | 168000000']]]
];
"#;

const SHARD_V: &str = r#"[
  ["value_mask", ["VALUE_MASK", ["../regs_8h.html#a1", 1, "regs.h"]]]
]"#;

fn names(results: &doxsearch::SearchResults) -> Vec<&str> {
    results
        .items
        .iter()
        .map(|i| i.display_name.as_str())
        .collect()
}

#[test]
fn test_hse_prefix_matches_in_key_order() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);

    let results = engine.search("hse");
    assert_eq!(
        names(&results),
        vec![
            "System Clock source                    | PLL (HSE)",
            "HSE_STARTUP_TIMEOUT",
            "HSE_VALUE"
        ]
    );
    assert!(results.items.iter().all(|i| i.kind == MatchKind::Prefix));

    let narrowed = engine.search("HSE_");
    assert_eq!(names(&narrowed), vec!["HSE_STARTUP_TIMEOUT", "HSE_VALUE"]);
}

#[test]
fn test_substring_matches_rank_below_prefix_matches() {
    let engine = memory_engine(&[("all_h", SHARD_H), ("all_v", SHARD_V)]);
    engine.ensure_shard_loaded(&PartitionKey::new("h")).unwrap();

    let results = engine.search("value");
    assert_eq!(names(&results), vec!["VALUE_MASK", "HSE_VALUE", "HSI_VALUE"]);
    assert_eq!(results.items[0].kind, MatchKind::Prefix);
    assert_eq!(results.items[1].kind, MatchKind::Substring);
    assert_eq!(results.items[2].kind, MatchKind::Substring);
}

#[test]
fn test_only_substring_match_is_returned_without_prefix_candidates() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);
    engine.ensure_shard_loaded(&PartitionKey::new("h")).unwrap();

    let results = engine.search("startup");
    assert_eq!(names(&results), vec!["HSE_STARTUP_TIMEOUT"]);
    assert_eq!(results.items[0].kind, MatchKind::Substring);
}

#[test]
fn test_every_entry_matches_its_own_key() {
    let engine = memory_engine(&[("all_h", SHARD_H), ("all_v", SHARD_V)]);
    engine.loader().ensure_all_loaded().unwrap();

    let snapshot = engine.index().snapshot();
    assert_eq!(snapshot.len(), 6);

    for indexed in snapshot.entries() {
        let results = engine.search_with_limit(&indexed.entry.key, 0);
        assert!(
            results
                .items
                .iter()
                .any(|i| i.key == indexed.entry.key
                    && i.display_name == indexed.entry.display_name),
            "search({:?}) did not return its own entry",
            indexed.entry.key
        );
    }
}

#[test]
fn test_empty_query_returns_nothing() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);
    engine.ensure_shard_loaded(&PartitionKey::new("h")).unwrap();

    for raw in ["", " ", "\t\n", "()|"] {
        let results = engine.search(raw);
        assert!(results.is_empty(), "query {raw:?} returned results");
        assert!(!results.truncated);
        assert_eq!(results.total, 0);
    }
}

#[test]
fn test_no_match_is_empty_not_error() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);
    let results = engine.search("hxyz");
    assert!(results.is_empty());
    assert_eq!(results.query, "hxyz");
}

#[test]
fn test_truncation_to_two_of_three() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);

    let results = engine.search_with_limit("hs", 2);
    assert_eq!(results.len(), 2);
    assert_eq!(results.total, 4);
    assert!(results.truncated);

    let three = engine.search_with_limit("hse", 2);
    assert_eq!(three.len(), 2);
    assert_eq!(three.total, 3);
    assert!(three.truncated);
    assert_eq!(
        names(&three),
        vec!["System Clock source                    | PLL (HSE)", "HSE_STARTUP_TIMEOUT"]
    );
}

#[test]
fn test_multi_occurrence_entry_is_grouped_with_labels() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);

    let results = engine.search("hz 168");
    assert_eq!(results.len(), 1);

    let pairs = results.pairs();
    let (name, links) = &pairs[0];
    assert_eq!(*name, "Hz 168000000");
    assert_eq!(
        links,
        &vec![
            (
                "HCLK(Hz)                               | 168000000",
                "../system__stm32f4xx_8c.html#autotoc_md4"
            ),
            (
                "SYSCLK(Hz)                             | 168000000",
                "../system__stm32f4xx_8c.html#autotoc_md3"
            ),
        ]
    );
    assert!(results.items[0].grouped);
}

#[test]
fn test_repeated_queries_do_not_accumulate_state() {
    let engine = memory_engine(&[("all_h", SHARD_H)]);

    let first = engine.search("hs");
    let _ = engine.search("hse_v");
    let _ = engine.search("");
    let again = engine.search("hs");
    assert_eq!(first, again);
}
