use staking_core::{load, EntityKind, EntityStore, EventCursor, GlobalStats, Timestamp, User, WriteBatch};
use staking_storage::{SledEntityStore, SCHEMA_VERSION};

fn batch_with(user: &User, cursor: EventCursor) -> WriteBatch {
    let mut batch = WriteBatch::new();
    batch.put(
        EntityKind::User,
        "0xaa",
        staking_core::encode_entity(user).unwrap(),
    );
    batch.set_cursor(cursor);
    batch
}

#[test]
fn committed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");
    let cursor = EventCursor {
        block_number: 12,
        log_index: 3,
    };
    let mut user = User::new("0xaa");
    user.stake(40u64.into(), Timestamp(9)).unwrap();

    {
        let store = SledEntityStore::open(&path).unwrap();
        store.commit(batch_with(&user, cursor)).unwrap();
        store.flush().unwrap();
    }

    let store = SledEntityStore::open(&path).unwrap();
    assert_eq!(store.schema_version().unwrap().as_deref(), Some(SCHEMA_VERSION));
    assert_eq!(store.cursor().unwrap(), Some(cursor));
    assert_eq!(load::<User, _>(&store, "0xaa").unwrap(), Some(user));
    assert_eq!(load::<GlobalStats, _>(&store, "global").unwrap(), None);
}

#[test]
fn empty_store_has_no_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledEntityStore::open(dir.path().join("index")).unwrap();
    assert_eq!(store.cursor().unwrap(), None);
    assert!(store.scan(EntityKind::Transfer).unwrap().is_empty());
}

#[test]
fn applied_markers_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");
    let mut user = User::new("0xaa");
    user.credit_tokens(1u64.into()).unwrap();
    let mut batch = batch_with(
        &user,
        EventCursor {
            block_number: 4,
            log_index: 0,
        },
    );
    batch.mark_applied("0x01-0");

    {
        let store = SledEntityStore::open(&path).unwrap();
        assert!(!store.is_applied("0x01-0").unwrap());
        store.commit(batch).unwrap();
        store.flush().unwrap();
    }

    let store = SledEntityStore::open(&path).unwrap();
    assert!(store.is_applied("0x01-0").unwrap());
    assert!(!store.is_applied("0x01-1").unwrap());
    assert!(store.scan(EntityKind::User).unwrap().len() == 1);
}
