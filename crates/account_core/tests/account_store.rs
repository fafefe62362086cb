use account_core::{
    Account, AccountStore, KeyValueStorage, Mark, MemoryStorage, RecordType,
    SqliteKeyValueStorage, StorageResult, StoreError, DEFAULT_STORAGE_KEY,
};
use serde_json::Value;

/// Wraps a storage and counts writes.
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    sets: usize,
    removes: usize,
}

impl KeyValueStorage for CountingStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.sets += 1;
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<()> {
        self.removes += 1;
        self.inner.remove_item(key)
    }
}

fn stored_json(storage: &impl KeyValueStorage) -> Value {
    let raw = storage
        .get_item(DEFAULT_STORAGE_KEY)
        .unwrap()
        .expect("accounts should be persisted");
    serde_json::from_str(&raw).unwrap()
}

fn local_account(id: u64, login: &str) -> Account {
    Account {
        id,
        marks: vec![Mark::new("team")],
        record_type: RecordType::Local,
        login: login.to_string(),
        password: Some("pw".to_string()),
    }
}

#[test]
fn create_on_empty_store_returns_local_draft_with_id_one() {
    let mut store = AccountStore::open(MemoryStorage::new()).unwrap();

    let account = store.create().unwrap();
    assert_eq!(account.id, 1);
    assert_eq!(account.record_type, RecordType::Local);
    assert!(account.marks.is_empty());
    assert_eq!(account.login, "");
    assert_eq!(account.password.as_deref(), Some(""));

    assert_eq!(
        stored_json(store.storage()),
        serde_json::json!([
            { "id": 1, "marks": [], "recordType": "local", "login": "", "password": "" }
        ])
    );
}

#[test]
fn create_assigns_increasing_ids() {
    let mut store = AccountStore::open(MemoryStorage::new()).unwrap();
    let ids = (0..3)
        .map(|_| store.create().unwrap().id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn removed_ids_are_not_reused() {
    let mut store = AccountStore::open(MemoryStorage::new()).unwrap();
    store.create().unwrap();
    let second = store.create().unwrap();
    assert!(store.remove(second.id).unwrap());

    assert_eq!(store.create().unwrap().id, 3);
}

#[test]
fn restore_recomputes_counter_from_max_id() {
    let payload = serde_json::to_string(&vec![
        local_account(3, "c"),
        local_account(7, "g"),
        local_account(2, "b"),
    ])
    .unwrap();
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, payload);

    let mut store = AccountStore::open(storage).unwrap();
    let ids = store.accounts().iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 7, 2]);
    assert_eq!(store.next_id(), Some(8));
    assert_eq!(store.create().unwrap().id, 8);
}

#[test]
fn restore_of_empty_array_starts_counter_at_zero() {
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, "[]");
    let mut store = AccountStore::open(storage).unwrap();

    assert!(store.is_empty());
    assert_eq!(store.create().unwrap().id, 1);
}

#[test]
fn restore_keeps_ldap_null_password() {
    let raw = r#"[{"id":5,"marks":[{"text":"x"}],"recordType":"ldap","login":"jdoe","password":null}]"#;
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, raw);
    let store = AccountStore::open(storage).unwrap();

    let account = store.get(5).unwrap();
    assert_eq!(account.record_type, RecordType::Ldap);
    assert_eq!(account.password, None);
}

#[test]
fn garbage_in_storage_is_discarded_and_key_cleared() {
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, "{not json");
    let store = AccountStore::open(storage).unwrap();

    assert!(store.is_empty());
    assert_eq!(store.next_id(), Some(1));
    assert!(!store.storage().contains_key(DEFAULT_STORAGE_KEY));
}

#[test]
fn wrong_shape_in_storage_is_discarded() {
    for raw in [r#"{"id":1}"#, r#"[{"id":-1}]"#, r#"[{"id":1,"recordType":"kerberos"}]"#] {
        let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, raw);
        let store = AccountStore::open(storage).unwrap();

        assert!(store.is_empty(), "payload {raw} should be discarded");
        assert!(!store.storage().contains_key(DEFAULT_STORAGE_KEY));
    }
}

#[test]
fn every_mutation_rewrites_full_collection() {
    let mut store = AccountStore::open(CountingStorage::default()).unwrap();
    store.create().unwrap();
    store.create().unwrap();
    store.update(1, local_account(1, "alice")).unwrap();
    store.remove(2).unwrap();

    assert_eq!(store.storage().sets, 4);
    assert_eq!(
        stored_json(store.storage()),
        serde_json::json!([
            {
                "id": 1,
                "marks": [{ "text": "team" }],
                "recordType": "local",
                "login": "alice",
                "password": "pw"
            }
        ])
    );
}

#[test]
fn unknown_id_update_and_remove_are_silent_no_ops() {
    let mut store = AccountStore::open(CountingStorage::default()).unwrap();
    store.create().unwrap();

    assert!(!store.update(42, local_account(42, "ghost")).unwrap());
    assert!(!store.remove(42).unwrap());
    assert!(store.remove(1).unwrap());
    assert!(!store.remove(1).unwrap());

    assert_eq!(store.storage().sets, 2);
    assert_eq!(store.storage().removes, 0);
    assert!(store.is_empty());
}

#[test]
fn sqlite_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");

    let mut store = AccountStore::open(SqliteKeyValueStorage::open(&path).unwrap()).unwrap();
    store.create().unwrap();
    let second = store.create().unwrap();
    store.update(second.id, local_account(second.id, "bob")).unwrap();
    drop(store);

    let mut reopened =
        AccountStore::open(SqliteKeyValueStorage::open(&path).unwrap()).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(2), Some(&local_account(2, "bob")));
    assert_eq!(reopened.create().unwrap().id, 3);
}

#[test]
fn store_borrowing_storage_leaves_it_usable() {
    let mut storage = MemoryStorage::new();
    {
        let mut store = AccountStore::open(&mut storage).unwrap();
        store.create().unwrap();
    }

    assert!(storage.contains_key(DEFAULT_STORAGE_KEY));
    let store = AccountStore::open(storage).unwrap();
    assert_eq!(store.next_id(), Some(2));
}

#[test]
fn create_after_max_id_restore_fails_without_reusing_ids() {
    let payload = serde_json::to_string(&vec![local_account(u64::MAX, "last")]).unwrap();
    let storage = MemoryStorage::new().with_item(DEFAULT_STORAGE_KEY, payload.clone());
    let mut store = AccountStore::open(storage).unwrap();
    assert_eq!(store.next_id(), None);

    let err = store.create().unwrap_err();
    assert!(matches!(err, StoreError::IdSpaceExhausted { last_id } if last_id == u64::MAX));
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.storage().get_item(DEFAULT_STORAGE_KEY).unwrap(),
        Some(payload)
    );
}

#[test]
fn into_storage_hands_back_persisted_state() {
    let mut store = AccountStore::open(MemoryStorage::new()).unwrap();
    store.create().unwrap();
    let storage = store.into_storage();

    let reopened = AccountStore::open(storage).unwrap();
    assert_eq!(reopened.accounts(), &[Account::draft(1)]);
    assert_eq!(reopened.next_id(), Some(2));
}
