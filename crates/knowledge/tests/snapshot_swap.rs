use std::sync::Arc;
use std::thread;

use kisan_knowledge::{EntryRecord, KnowledgeStore, StoreHandle};

fn store_with(ids: &[&str]) -> KnowledgeStore {
    KnowledgeStore::try_from_records(ids.iter().map(|id| {
        EntryRecord::new(*id, format!("Advisory {id}"))
            .summary("Weekly crop advisory")
            .language("mr")
            .source("IMD Agromet")
            .last_updated("2024-07-01")
    }))
    .unwrap()
}

#[test]
fn snapshot_taken_before_replace_sees_old_corpus() {
    let handle = StoreHandle::new(store_with(&["a", "b"]));
    let before = handle.snapshot();

    let previous = handle.replace(store_with(&["c"]));

    assert_eq!(before.len(), 2);
    assert!(before.get("a").is_some());
    assert!(Arc::ptr_eq(&before, &previous));

    let after = handle.snapshot();
    assert_eq!(after.len(), 1);
    assert!(after.get("a").is_none());
}

#[test]
fn concurrent_readers_always_see_a_consistent_store() {
    let handle = Arc::new(StoreHandle::new(store_with(&["a", "b"])));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = handle.snapshot();
                    let ids: Vec<&str> = snapshot.iter().map(|e| e.id()).collect();
                    assert!(ids == ["a", "b"] || ids == ["c", "d", "e"], "{ids:?}");
                }
            })
        })
        .collect();

    for _ in 0..50 {
        handle.replace(store_with(&["c", "d", "e"]));
        handle.replace(store_with(&["a", "b"]));
    }

    for reader in readers {
        reader.join().unwrap();
    }
}
