use super::fixtures::scenario_recording;
use crate::error::Error;
use crate::transfer::{
    DEFAULT_TTL_SECS, FileStore, MemoryChannel, MemoryStore, RecordingStore, RetentionPolicy,
    Strategy, TransferConfig, TransferLayer,
};
use std::sync::Arc;
use uuid::Uuid;

fn keep_forever() -> RetentionPolicy {
    RetentionPolicy {
        ttl_secs: None,
        delete_on_receive: false,
    }
}

#[test]
fn default_retention_is_one_day() {
    let policy = RetentionPolicy::default();
    assert_eq!(policy.ttl_secs, Some(DEFAULT_TTL_SECS));
    assert_eq!(DEFAULT_TTL_SECS, 86_400);
    assert!(!policy.delete_on_receive);
}

#[test]
fn memory_store_handles_are_unique() {
    let store = MemoryStore::new(keep_forever());
    let rec = scenario_recording();
    let a = store.put(&rec).expect("put");
    let b = store.put(&rec).expect("put");
    assert_ne!(a, b);
    assert!(Uuid::parse_str(&a).is_ok());
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&a).expect("get"), rec);

    assert!(store.remove(&a).expect("remove"));
    assert!(!store.remove(&a).expect("second remove"));
    assert!(matches!(store.get(&a), Err(Error::UnknownHandle(_))));
}

#[test]
fn memory_store_evicts_after_ttl() {
    let store = MemoryStore::new(RetentionPolicy {
        ttl_secs: Some(0),
        delete_on_receive: false,
    });
    store.put(&scenario_recording()).expect("put");
    assert_eq!(store.evict_expired().expect("evict"), 1);
    assert!(store.is_empty());
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path().join("store"), keep_forever()).expect("open");
    let rec = scenario_recording();

    let handle = store.put(&rec).expect("put");
    let path = store.dir().join(format!("{handle}.json"));
    assert!(path.exists());
    assert_eq!(store.get(&handle).expect("get"), rec);

    assert!(store.remove(&handle).expect("remove"));
    assert!(!path.exists());
    assert!(matches!(store.get(&handle), Err(Error::UnknownHandle(_))));
}

#[test]
fn file_store_rejects_non_uuid_handles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path(), keep_forever()).expect("open");
    assert!(matches!(
        store.get("../../etc/passwd"),
        Err(Error::UnknownHandle(_))
    ));
    assert!(matches!(
        store.remove("not-a-handle"),
        Err(Error::UnknownHandle(_))
    ));
    let missing = Uuid::new_v4().to_string();
    assert!(matches!(store.get(&missing), Err(Error::UnknownHandle(_))));
}

#[test]
fn file_store_eviction_follows_retention() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rec = scenario_recording();

    let forever = FileStore::open(dir.path(), keep_forever()).expect("open");
    forever.put(&rec).expect("put");
    assert_eq!(forever.evict_expired().expect("evict"), 0);

    let instant = FileStore::open(dir.path(), RetentionPolicy {
        ttl_secs: Some(0),
        delete_on_receive: false,
    })
    .expect("open");
    assert_eq!(instant.evict_expired().expect("evict"), 1);
}

#[test]
fn file_store_eviction_leaves_foreign_files_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path(), RetentionPolicy {
        ttl_secs: Some(0),
        delete_on_receive: false,
    })
    .expect("open");
    let user_file = dir.path().join("session-2025-01-02.json");
    std::fs::write(&user_file, "{}").expect("write");
    let user_tmp = dir.path().join("draft.json.tmp");
    std::fs::write(&user_tmp, "{}").expect("write");
    let stale_tmp = dir.path().join(format!("{}.json.tmp", Uuid::new_v4()));
    std::fs::write(&stale_tmp, "{").expect("write");

    let handle = store.put(&scenario_recording()).expect("put");
    // put 前的淘汰已经清掉了残留的临时文件
    assert!(!stale_tmp.exists());

    assert_eq!(store.evict_expired().expect("evict"), 1);
    assert!(!store.dir().join(format!("{handle}.json")).exists());
    assert!(user_file.exists());
    assert!(user_tmp.exists());
}

#[test]
fn rejected_reference_frame_leaves_no_stored_copy() {
    let store = Arc::new(MemoryStore::new(keep_forever()));
    let layer = TransferLayer::new(TransferConfig::default(), store.clone());
    // 通道上限比 36 字节的句柄还小
    let mut channel = MemoryChannel::new(8);

    let err = layer
        .send_with(&scenario_recording(), Strategy::Reference, &mut channel)
        .expect_err("handle exceeds the ceiling");
    assert!(matches!(err, Error::PayloadTooLarge { ceiling: 8, .. }));
    assert!(store.is_empty());
}

#[test]
fn reference_transfer_through_a_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(
        FileStore::open(dir.path(), RetentionPolicy {
            delete_on_receive: true,
            ..RetentionPolicy::default()
        })
        .expect("open"),
    );
    let layer = TransferLayer::new(TransferConfig::default(), store.clone());
    let rec = scenario_recording();
    let mut channel = MemoryChannel::new(128);

    let env = layer
        .send_with(&rec, Strategy::Reference, &mut channel)
        .expect("send");
    assert_eq!(layer.receive(env, &mut channel).expect("receive"), rec);

    let left = std::fs::read_dir(store.dir()).expect("read dir").count();
    assert_eq!(left, 0);
}
