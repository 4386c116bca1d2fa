use std::fs;

use cashbook_core::{EntryDraft, LedgerService, LedgerSession, LedgerStorage};
use cashbook_domain::{EntryId, Ledger};
use cashbook_storage_json::{
    load_ledger_from_path, save_ledger_to_path, JsonLedgerStorage, StoragePaths,
};
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn storage_in(dir: &std::path::Path) -> JsonLedgerStorage {
    JsonLedgerStorage::new(StoragePaths::under(dir)).expect("create storage")
}

#[test]
fn json_storage_can_save_and_load_ledger() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());

    let mut ledger = LedgerService::create("Home Budget");
    LedgerService::submit(
        &mut ledger,
        &EntryDraft::new("2026-01-07", "Loan", "expense", "40000").with_installments(3),
    )
    .expect("submit");

    storage.save_ledger("Home Budget", &ledger).expect("save ledger");
    let loaded = storage.load_ledger("Home Budget").expect("load ledger");

    assert_eq!(loaded, ledger);
    assert_eq!(loaded.next_id(), EntryId(4));
    let path = storage.ledger_path("Home Budget");
    assert!(path.ends_with("ledgers/home_budget.json"));
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(storage.list_ledgers().unwrap(), vec!["home_budget"]);
}

#[test]
fn saving_twice_keeps_previous_file_as_backup() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());

    let mut ledger = Ledger::new("home");
    storage.save_ledger("home", &ledger).unwrap();
    assert!(storage.list_backups("home").unwrap().is_empty());

    LedgerService::submit(&mut ledger, &EntryDraft::new("2026-03-01", "Rent", "expense", "900"))
        .unwrap();
    storage.save_ledger("home", &ledger).unwrap();

    let backups = storage.list_backups("home").unwrap();
    assert_eq!(backups.len(), 1);
    let previous = load_ledger_from_path(&backups[0].path).unwrap();
    assert!(previous.is_empty());
    assert!(backups[0].path.starts_with(dir.path().join("backups").join("home")));
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::with_retention(StoragePaths::under(dir.path()), 2).unwrap();
    let ledger = Ledger::new("home");
    for _ in 0..5 {
        storage.save_ledger("home", &ledger).unwrap();
    }
    assert_eq!(storage.list_backups("home").unwrap().len(), 2);
}

#[test]
fn corrupted_snapshot_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let path = storage.ledger_path("broken");
    fs::write(
        &path,
        r#"{
            "id": "6f1c7f1e-9d7a-4c9c-8d0e-2f1b8e0c9a11",
            "name": "broken",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "schema_version": 1,
            "next_id": 3,
            "entries": [
                {"id": 1, "date": "2026-01-01", "description": "a", "kind": "INCOME", "amount": "5", "status": "PENDING"},
                {"id": 1, "date": "2026-01-02", "description": "b", "kind": "INCOME", "amount": "6", "status": "PENDING"}
            ]
        }"#,
    )
    .unwrap();
    let err = storage.load_ledger("broken").unwrap_err();
    assert!(err.to_string().contains("Serialization"), "{err}");
}

#[test]
fn missing_ledger_and_delete() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    assert!(storage.load_ledger("ghost").is_err());
    assert!(!storage.contains_ledger("ghost").unwrap());

    storage.save_ledger("ghost", &Ledger::new("ghost")).unwrap();
    assert!(storage.contains_ledger("ghost").unwrap());
    storage.delete_ledger("ghost").unwrap();
    assert!(storage.list_ledgers().unwrap().is_empty());
}

#[test]
fn path_helpers_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("exports").join("copy.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let ledger = Ledger::new("copy");
    save_ledger_to_path(&ledger, &path).unwrap();
    assert_eq!(load_ledger_from_path(&path).unwrap(), ledger);
}

#[test]
fn session_over_json_storage_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let mut session = LedgerSession::open(storage_in(dir.path()), "Household").unwrap();
    session
        .add(&EntryDraft::new("2026-01-15", "Electricity", "expense", "3611"))
        .unwrap();
    session.settle(EntryId(1)).unwrap();

    let reopened = LedgerSession::open(storage_in(dir.path()), "Household").unwrap();
    let stored = reopened.ledger().get(EntryId(1)).unwrap();
    assert!(stored.entry.is_settled());
    assert_eq!(stored.entry.amount, dec!(3611));

    let metadata = reopened.storage().list_ledger_metadata().unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].name, "Household");
    assert_eq!(metadata[0].entry_count, 1);
}
