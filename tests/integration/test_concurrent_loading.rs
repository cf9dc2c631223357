//! Readers never observe a partially merged shard, and racing loads of the
//! same shard merge it once.

use crate::common::memory_engine;
use doxsearch::index::MergeOutcome;
use doxsearch::shard::ParsedShard;
use doxsearch::{MergedIndex, Occurrence, PartitionKey, ShardId, SymbolEntry};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const SHARDS: usize = 12;
const ENTRIES_PER_SHARD: usize = 200;

fn synthetic_shard(n: usize) -> ParsedShard {
    let entries = (0..ENTRIES_PER_SHARD)
        .map(|i| {
            SymbolEntry::new(
                format!("s{n}_symbol_{i}"),
                format!("S{n}_SYMBOL_{i}"),
                vec![Occurrence::new(format!("../s{n}.html#{i}"), "file.h")],
            )
        })
        .collect();
    ParsedShard {
        shard: ShardId::new(format!("all_{n:x}")),
        entries,
        skipped: 0,
    }
}

#[test]
fn test_readers_see_whole_shards_only() {
    let index = Arc::new(MergedIndex::new());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observed = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = index.snapshot();
                    assert_eq!(
                        snapshot.len(),
                        snapshot.shards().len() * ENTRIES_PER_SHARD,
                        "snapshot exposed a partially merged shard"
                    );
                    for shard in snapshot.shards() {
                        let count = snapshot
                            .entries()
                            .iter()
                            .filter(|e| &e.shard == shard)
                            .count();
                        assert_eq!(count, ENTRIES_PER_SHARD);
                    }
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    let writers: Vec<_> = (0..SHARDS)
        .map(|n| {
            let index = Arc::clone(&index);
            thread::spawn(move || index.insert_shard(synthetic_shard(n)))
        })
        .collect();

    for writer in writers {
        assert!(matches!(writer.join().unwrap(), MergeOutcome::Merged(_)));
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }

    let snapshot = index.snapshot();
    assert_eq!(snapshot.len(), SHARDS * ENTRIES_PER_SHARD);
    assert_eq!(snapshot.shards().len(), SHARDS);
}

#[test]
fn test_ordinals_stay_dense_under_concurrent_inserts() {
    let index = Arc::new(MergedIndex::new());

    let writers: Vec<_> = (0..SHARDS)
        .map(|n| {
            let index = Arc::clone(&index);
            thread::spawn(move || index.insert_shard(synthetic_shard(n)))
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let snapshot = index.snapshot();
    for (i, entry) in snapshot.entries().iter().enumerate() {
        assert_eq!(entry.ordinal.value(), i as u64);
    }
}

#[test]
fn test_racing_loads_of_one_shard_merge_once() {
    let payload = r#"var searchData=
[
  ['hse_5fvalue_16',['HSE_VALUE',['../group.html#gae',1,'stm32f4xx.h']]],
  ['hsi_5fvalue_17',['HSI_VALUE',['../group.html#gaa',1,'stm32f4xx.h']]]
];
"#;
    let engine = Arc::new(memory_engine(&[("all_h", payload)]));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .ensure_shard_loaded(&PartitionKey::new("h"))
                    .unwrap()
                    .is_loaded()
            })
        })
        .collect();

    let loaded = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&loaded| loaded)
        .count();

    assert_eq!(loaded, 1);
    assert_eq!(engine.index().len(), 2);
    assert_eq!(engine.search("value").len(), 2);
}

#[test]
fn test_search_while_loading_returns_consistent_results() {
    let shard_h = r#"[["hse_value", ["HSE_VALUE", ["../a.html#1", 1, "a.h"]]]]"#;
    let shard_v = r#"[["value_mask", ["VALUE_MASK", ["../b.html#2", 1, "b.h"]]]]"#;
    let engine = Arc::new(memory_engine(&[("all_h", shard_h), ("all_v", shard_v)]));

    let searchers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    let results = engine.search_with_limit("value", 0);
                    assert!(results.len() <= 2);
                    assert_eq!(results.total, results.len());
                }
            })
        })
        .collect();

    engine.loader().ensure_all_loaded().unwrap();
    for searcher in searchers {
        searcher.join().unwrap();
    }

    let names: Vec<String> = engine
        .search("value")
        .items
        .into_iter()
        .map(|i| i.display_name)
        .collect();
    assert_eq!(names, vec!["VALUE_MASK", "HSE_VALUE"]);
}
