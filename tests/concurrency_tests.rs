//! Concurrency and snapshot isolation tests for docsearch

use std::sync::Arc;
use std::thread;

use docsearch::{
    Document, FieldMappings, FieldType, FieldValue, IndexStore, Query, QueryConfig, QueryEngine,
    SnapshotSource,
};

fn doc(id: usize, title: &str) -> Document {
    Document::new(format!("d{id:05}")).with_field("title", FieldValue::Text(title.into()))
}

fn setup() -> (Arc<IndexStore>, Arc<QueryEngine>, String) {
    let store = Arc::new(IndexStore::new());
    let id = store
        .create_index(
            "concurrent",
            FieldMappings::new().with_field("title", FieldType::Text),
        )
        .unwrap();
    store
        .add_documents(&id, (0..100).map(|i| doc(i, "steady state")).collect())
        .unwrap();
    let engine = Arc::new(QueryEngine::new(store.clone(), QueryConfig::default()).unwrap());
    (store, engine, id)
}

#[test]
fn concurrent_readers_agree() {
    let (_store, engine, id) = setup();
    let query = Query::new(id).with_term("steady").with_page(1, 20);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let query = query.clone();
            thread::spawn(move || engine.execute(&query).expect("execute should succeed"))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0];
    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(first.hits, result.hits, "Thread {i} saw a different page");
        assert_eq!(first.total, result.total);
    }
}

#[test]
fn readers_never_see_partial_batches() {
    let (store, engine, id) = setup();
    const BATCHES: usize = 20;
    const BATCH_SIZE: usize = 10;

    let writer = {
        let store = Arc::clone(&store);
        let id = id.clone();
        thread::spawn(move || {
            for batch in 0..BATCHES {
                let docs = (0..BATCH_SIZE)
                    .map(|j| doc(1_000 + batch * BATCH_SIZE + j, "fresh arrival"))
                    .collect();
                store.add_documents(&id, docs).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let query = Query::new(id.clone()).with_term("fresh").with_page(1, 1);
            thread::spawn(move || {
                let mut last_version = 0;
                for _ in 0..200 {
                    let results = engine.execute(&query).unwrap();
                    // Version v carries exactly (v - 1) batches on top of the seed batch.
                    let batches = results.version.saturating_sub(1) as usize;
                    assert_eq!(results.total, batches * BATCH_SIZE);
                    assert!(results.version >= last_version, "version went backwards");
                    last_version = results.version;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let final_snapshot = store.snapshot(&id).unwrap();
    assert_eq!(final_snapshot.len(), 100 + BATCHES * BATCH_SIZE);
    assert_eq!(final_snapshot.version(), 1 + BATCHES as u64);
}

#[test]
fn concurrent_writers_all_land() {
    let (store, engine, id) = setup();
    let handles: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            let id = id.clone();
            thread::spawn(move || {
                for k in 0..25 {
                    store
                        .add_document(&id, doc(10_000 + w * 100 + k, "writer output"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let results = engine
        .execute(&Query::new(id).with_term("writer").with_page(1, 1))
        .unwrap();
    assert_eq!(results.total, 100);
}

#[test]
fn held_snapshot_stays_frozen() {
    let (store, engine, id) = setup();
    let held = store.snapshot(&id).unwrap();
    store
        .add_documents(&id, (0..5).map(|i| doc(500 + i, "steady late")).collect())
        .unwrap();

    let old = engine
        .execute_on(&held, &Query::new(id.clone()).with_term("steady").with_page(1, 1))
        .unwrap();
    let new = engine
        .execute(&Query::new(id).with_term("steady").with_page(1, 1))
        .unwrap();
    assert_eq!(old.total, 100);
    assert_eq!(new.total, 105);
}
