use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use coinbank_core::document::to_document;
use coinbank_core::{
    AccountStore, CoinbankError, DocumentStore, Filter, MemoryStore, SqliteStore, Update,
    UpdateOutcome,
};
use serde_json::{json, Value};

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let filename = format!("{}_{}_{}.db", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(filename);
        Self { path }
    }

    fn open(&self) -> AccountStore<SqliteStore> {
        let store = SqliteStore::open_path(&self.path, "test").expect("open should succeed");
        AccountStore::new(store)
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn clean<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    accounts
        .store_mut()
        .delete_many(&Filter::new())
        .expect("cleanup should succeed");
}

fn check_single_insert<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    clean(accounts);

    let id = accounts
        .create(&to_document(json!({"name": "foo", "amount": 0})).unwrap())
        .expect("create should succeed");

    assert_eq!(accounts.store().count(&Filter::new()).unwrap(), 1);
    let found = accounts.get(&id).expect("read should succeed");
    assert_eq!(found.map(|account| account.id), Some(id));

    clean(accounts);
}

fn check_read_by_filter<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    let cases = [
        ("found foo account", json!({"name": "foo"}), json!({"name": "foo", "amount": 0})),
        ("found bar account", json!({}), json!({"name": "bar", "amount": 5})),
    ];

    for (name, filter, existing) in cases {
        clean(accounts);
        let inserted = accounts
            .store_mut()
            .insert_one(&to_document(existing).unwrap())
            .expect("insert should succeed");

        let filter = Filter::from_value(filter).unwrap();
        let account = accounts.read(&filter).expect("read should succeed");
        assert_eq!(account.map(|account| account.id), Some(inserted), "{}", name);
    }

    clean(accounts);
}

fn check_read_missing<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    clean(accounts);
    accounts
        .create(&to_document(json!({"name": "bar", "amount": 5})).unwrap())
        .unwrap();

    let account = accounts
        .read(&Filter::new().eq("name", "foo"))
        .expect("missing account is not an error");
    assert!(account.is_none());

    clean(accounts);
}

fn check_increment<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    clean(accounts);
    let id = accounts
        .create(&to_document(json!({"name": "foo", "amount": 0})).unwrap())
        .unwrap();

    let update = Update::from_value(json!({"$inc": {"amount": 1}})).unwrap();
    let outcome = accounts.update(&id, &update).expect("update should succeed");
    assert_eq!(outcome, UpdateOutcome::applied(true));

    let stored = accounts
        .read_document(&Filter::by_id(id))
        .unwrap()
        .expect("account should exist");
    assert_eq!(stored.get("amount"), Some(&json!(1)));

    clean(accounts);
}

fn check_update_unknown_id<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    clean(accounts);
    let existing = accounts
        .create(&to_document(json!({"name": "foo", "amount": 0})).unwrap())
        .unwrap();

    let unknown = coinbank_core::DocumentId::generate();
    let outcome = accounts
        .update(&unknown, &Update::new().inc("amount", 1))
        .expect("unknown id is a no-op");
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.modified, 0);
    assert_eq!(accounts.store().count(&Filter::new()).unwrap(), 1);
    assert_eq!(accounts.get(&existing).unwrap().unwrap().amount, 0.0);

    clean(accounts);
}

fn check_id_is_immutable<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    clean(accounts);
    let id = accounts
        .create(&to_document(json!({"name": "foo"})).unwrap())
        .unwrap();

    let update = Update::new().set("_id", "stolen");
    assert!(accounts.update(&id, &update).is_err());
    assert!(accounts.get(&id).unwrap().is_some());

    clean(accounts);
}

fn run_all<S: DocumentStore>(accounts: &mut AccountStore<S>) {
    check_single_insert(accounts);
    check_read_by_filter(accounts);
    check_read_missing(accounts);
    check_increment(accounts);
    check_update_unknown_id(accounts);
    check_id_is_immutable(accounts);
}

#[test]
fn test_account_store_on_sqlite() {
    let temp = TempDb::new("coinbank_sqlite");
    let mut accounts = temp.open();
    run_all(&mut accounts);
}

#[test]
fn test_account_store_in_memory() {
    let mut accounts = AccountStore::new(MemoryStore::new());
    run_all(&mut accounts);
}

#[test]
fn test_chore_reward_persists_across_reopen() {
    let temp = TempDb::new("coinbank_reopen");

    let id = {
        let mut accounts = temp.open();
        let id = accounts
            .create(&to_document(json!({"name": "foo", "amount": 0})).unwrap())
            .unwrap();
        accounts.reward_chore(&id).unwrap();
        id
    };

    let accounts = temp.open();
    let stored = accounts.read_document(&Filter::by_id(id)).unwrap().unwrap();
    assert_eq!(stored.get("amount"), Some(&Value::from(50)));
}

#[test]
fn test_invalid_filter_is_rejected() {
    let err = Filter::from_value(json!({"amount": {"$near": 1}})).unwrap_err();
    assert!(matches!(err, CoinbankError::InvalidInput(_)));
}

#[test]
fn test_corrupt_row_is_a_storage_error() {
    let temp = TempDb::new("coinbank_corrupt");
    let mut accounts = temp.open();
    let id = accounts
        .create(&to_document(json!({"name": "foo", "amount": 0})).unwrap())
        .unwrap();

    let conn = rusqlite::Connection::open(&temp.path).expect("open raw connection");
    let changed = conn
        .execute(
            "UPDATE documents SET body_json = ?1 WHERE collection = ?2 AND id = ?3",
            rusqlite::params!["{not json", "test", id.to_string()],
        )
        .expect("corrupt row");
    assert_eq!(changed, 1);
    drop(conn);

    let by_id = accounts.read(&Filter::by_id(id));
    assert!(matches!(by_id, Err(CoinbankError::Storage(_))), "{:?}", by_id);

    let by_name = accounts.read(&Filter::new().eq("name", "foo"));
    assert!(matches!(by_name, Err(CoinbankError::Storage(_))), "{:?}", by_name);
}

#[test]
fn test_null_amount_reads_as_zero() {
    let mut accounts = AccountStore::new(MemoryStore::new());
    let id = accounts
        .create(&to_document(json!({"name": "foo", "amount": null})).unwrap())
        .unwrap();

    let account = accounts.get(&id).unwrap().expect("account should exist");
    assert_eq!(account.amount, 0.0);
}
