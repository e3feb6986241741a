//! Durability and integrity of the log-backed store under the full stack.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use keysync::store::{LogStore, Store, StoreError, StoreHub};
use keysync::sync::Context;

#[test]
fn synchronized_state_survives_process_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = Arc::new(LogStore::open(temp_dir.path()).unwrap());
        let hub = Arc::new(StoreHub::new(store as Arc<dyn Store>));
        let context = Context::attach(&hub);

        context.write("count", &41).unwrap();
        context.write("user", &json!({"name": "Ada"})).unwrap();
        context.write("count", &42).unwrap();
        context.write("scratch", &"gone soon").unwrap();
        context.remove("scratch").unwrap();
    }

    // Reopen: replay rebuilds the live view, latest record per key wins,
    // tombstoned keys stay gone.
    let store = Arc::new(LogStore::open(temp_dir.path()).unwrap());
    let hub = Arc::new(StoreHub::new(store as Arc<dyn Store>));
    let context = Context::attach(&hub);

    let count = context.subscribe("count", None).unwrap();
    assert_eq!(count.value(), Some(json!(42)));

    let user = context.subscribe("user", None).unwrap();
    assert_eq!(user.value(), Some(json!({"name": "Ada"})));

    let scratch = context.subscribe("scratch", None).unwrap();
    assert_eq!(scratch.value(), None);
}

#[test]
fn sibling_contexts_share_one_durable_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(LogStore::open(temp_dir.path()).unwrap());
    let hub = Arc::new(StoreHub::new(store as Arc<dyn Store>));

    let a = Context::attach(&hub);
    let b = Context::attach(&hub);

    let binding = b.subscribe("shared", None).unwrap();
    a.write("shared", &json!([1, 2, 3])).unwrap();

    assert_eq!(binding.value(), Some(json!([1, 2, 3])));
    assert_eq!(b.read("shared").unwrap(), Some(json!([1, 2, 3])));
}

#[test]
fn corrupted_log_refuses_to_open() {
    let temp_dir = TempDir::new().unwrap();

    let log_path = {
        let store = LogStore::open(temp_dir.path()).unwrap();
        store.set("key", "a value long enough to damage").unwrap();
        store.path().to_path_buf()
    };

    let mut data = fs::read(&log_path).unwrap();
    let mid = data.len() / 2;
    data[mid] ^= 0xFF;
    fs::write(&log_path, &data).unwrap();

    match LogStore::open(temp_dir.path()) {
        Err(StoreError::Corruption { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected corruption error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn interleaved_writes_and_removes_replay_correctly() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = LogStore::open(temp_dir.path()).unwrap();
        for round in 0..5 {
            store.set("a", &round.to_string()).unwrap();
            store.set("b", &(round * 10).to_string()).unwrap();
            store.remove("a").unwrap();
        }
        store.set("a", "final").unwrap();
    }

    let store = LogStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("final"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("40"));
    assert_eq!(store.len(), 2);
}
