//! Literal scenario tests mirroring the store's seed-test suite (S1-S6).

use std::io::Write;

use logdb::{Entity, Error, Id, Store};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct TestEntity {
    #[serde(skip)]
    id: String,
    field: String,
}

impl TestEntity {
    fn new(id: &str, field: &str) -> Self {
        TestEntity { id: id.to_string(), field: field.to_string() }
    }
}

impl Entity for TestEntity {
    fn species_id() -> Id {
        Id::new("test")
    }

    fn id(&self) -> Id {
        Id::new(&self.id)
    }

    fn set_id(&mut self, id: Id) {
        self.id = id.as_str().to_string();
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::ContractViolation(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::corrupt(None, e))
    }
}

fn framing(species: &str, id: &str) -> u64 {
    (species.len() + id.len() + 3) as u64
}

#[test]
fn s1_basic_store_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.data")).unwrap();

    let e = TestEntity::new("id4", "value 4.3");
    store.store(&e).unwrap();

    let loaded: TestEntity = store.load(&Id::new("id4")).unwrap();
    assert_eq!(loaded.field, "value 4.3");
}

#[test]
fn s2_replay_with_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.data");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        "test id1 {{\"field\":\"value 1\"}}\n\
         test id2 {{\"field\":\"value 2\"}}\n\
         test id3 {{\"field\":\"value 3\"}}\n\
         test id4 {{\"field\":\"value 4.1\"}}\n\
         test id5 {{\"field\":\"value 5\"}}\n\
         test id4 {{\"field\":\"value 4.2\"}}\n"
    )
    .unwrap();
    drop(file);

    let store = Store::open(&path).unwrap();

    for id in ["id1", "id2", "id3", "id4", "id5"] {
        let _: TestEntity = store.load(&Id::new(id)).unwrap();
    }

    let loaded: TestEntity = store.load(&Id::new("id4")).unwrap();
    assert_eq!(loaded.field, "value 4.2");

    let superseded_payload = b"{\"field\":\"value 4.1\"}";
    assert_eq!(store.wasted(), superseded_payload.len() as u64);
}

#[test]
fn s3_corruption_names_the_first_bad_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.data");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        "test id1 {{\"field\":\"value 1\"}}\n\
         test id\n\
         test id3 asdasd\n"
    )
    .unwrap();
    drop(file);

    let err = Store::open(&path).unwrap_err();
    match err {
        Error::Corrupt { line, .. } => assert_eq!(line, Some(2)),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

#[test]
fn s4_secondary_index_tracks_membership_as_entities_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.data")).unwrap();

    store.index::<TestEntity>("field", |e| Id::new(&e.field)).unwrap();

    store.store(&TestEntity::new("id1", "value 1")).unwrap();
    store.store(&TestEntity::new("id2", "value 2")).unwrap();
    store.store(&TestEntity::new("id3", "value 3")).unwrap();
    store.store(&TestEntity::new("id4", "value 4")).unwrap();
    store.store(&TestEntity::new("id5", "value 4")).unwrap();

    let mut results = Vec::new();
    store.query::<TestEntity>("field", &Id::new("value 4"), &mut results).unwrap();
    assert_eq!(results.len(), 2);

    store.store(&TestEntity::new("id6", "value 4")).unwrap();
    store.query::<TestEntity>("field", &Id::new("value 4"), &mut results).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn s5_compaction_is_payload_preserving_and_shrinks_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.data");
    let store = Store::open(&path).unwrap();

    store.store(&TestEntity::new("id1", "value 1")).unwrap();
    store.store(&TestEntity::new("id4", "value 4.1")).unwrap();
    store.store(&TestEntity::new("id4", "value 4.2")).unwrap();

    assert!(store.wasted() > 0);

    store.compact().unwrap();
    assert_eq!(store.wasted(), 0);

    let loaded: TestEntity = store.load(&Id::new("id4")).unwrap();
    assert_eq!(loaded.field, "value 4.2");

    let file_len = std::fs::metadata(&path).unwrap().len();
    let expected = store.size() + framing("test", "id1") + framing("test", "id4");
    assert_eq!(file_len, expected);
}

#[test]
fn s6_utf8_payloads_round_trip_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.data")).unwrap();

    let e = TestEntity::new("id1", "value æŝðđŝ¶ŧĥŝ¶ĥĝ");
    store.store(&e).unwrap();

    let loaded: TestEntity = store.load(&Id::new("id1")).unwrap();
    assert_eq!(loaded.field, e.field);
}

#[test]
fn reopen_reconstructs_directory_as_tail_of_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.data");

    {
        let store = Store::open(&path).unwrap();
        store.store(&TestEntity::new("id1", "a")).unwrap();
        store.store(&TestEntity::new("id2", "b")).unwrap();
        store.store(&TestEntity::new("id2", "c")).unwrap();
        store.delete::<TestEntity>(&Id::new("id1")).unwrap();
    }

    let reopened = Store::open(&path).unwrap();
    assert!(matches!(reopened.load::<TestEntity>(&Id::new("id1")), Err(Error::NotFound)));
    let loaded: TestEntity = reopened.load(&Id::new("id2")).unwrap();
    assert_eq!(loaded.field, "c");
}
