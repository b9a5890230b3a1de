mod common;

use std::fs;

use tally_core::{
    core::{services::EntryInput, LedgerManager},
    domain::{CategoryBook, EntryMode, TransactionType},
    errors::LedgerError,
    storage::{JsonFileStore, KeyValueStore, CATEGORIES_KEY, TRANSACTIONS_KEY},
};

use common::{file_manager, july_clock, memory_manager, reopen};

#[test]
fn file_store_round_trips_every_section() {
    let (mut manager, root) = file_manager();
    manager.set_mode(EntryMode::Professional).unwrap();
    manager.set_tax_percentage(21.0).unwrap();
    manager.add_category(TransactionType::Expense, "Pets").unwrap();
    let added = manager
        .add_transaction(
            &EntryInput::new(TransactionType::Expense, 121.0, "Pets", "Vet visit")
                .entered_as(tally_core::core::tax::EditedField::Total),
            None,
        )
        .unwrap();

    let reloaded = reopen(&root);
    assert_eq!(reloaded.transactions(), manager.transactions());
    assert_eq!(reloaded.transactions()[0], added);
    assert_eq!(reloaded.categories(), manager.categories());
    assert_eq!(reloaded.settings(), manager.settings());

    let raw = fs::read_to_string(root.join("tally_transactions.json")).unwrap();
    assert!(raw.contains("\"type\":\"expense\"") || raw.contains("\"type\": \"expense\""));
    assert!(raw.contains("baseAmount"));
}

#[test]
fn first_start_persists_default_categories() {
    let (_manager, root) = file_manager();
    let store = JsonFileStore::new(root).unwrap();
    let raw = store.get(CATEGORIES_KEY).unwrap().expect("categories seeded");
    let book: CategoryBook = serde_json::from_str(&raw).unwrap();
    assert_eq!(book, CategoryBook::defaults());
    assert!(store.get(TRANSACTIONS_KEY).unwrap().is_none());
}

#[test]
fn quota_failure_leaves_memory_and_store_unchanged() {
    let (mut manager, store) = memory_manager();
    manager
        .add_transaction(
            &EntryInput::new(TransactionType::Income, 900.0, "Salary", "Part pay"),
            None,
        )
        .unwrap();
    let before_txns = store.get(TRANSACTIONS_KEY).unwrap();
    store.set_quota(Some(store.used_bytes()));

    let err = manager
        .add_transaction(
            &EntryInput::new(TransactionType::Expense, 30.0, "Food", "Dinner out"),
            None,
        )
        .unwrap_err();
    assert!(err.to_string().contains("quota"));
    assert_eq!(manager.transactions().len(), 1);
    assert_eq!(store.get(TRANSACTIONS_KEY).unwrap(), before_txns);

    store.set_quota(None);
    manager
        .add_transaction(
            &EntryInput::new(TransactionType::Expense, 30.0, "Food", "Dinner out"),
            None,
        )
        .unwrap();
    assert_eq!(manager.transactions().len(), 2);
}

#[test]
fn corrupt_file_is_reported_and_left_in_place() {
    let (manager, root) = file_manager();
    drop(manager);
    let path = root.join("tally_settings.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(root.clone()).unwrap();
    let err = match LedgerManager::load_with_clock(Box::new(store), july_clock()) {
        Ok(_) => panic!("corrupt settings must not load"),
        Err(err) => err,
    };
    assert!(matches!(err, LedgerError::Serde(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn reload_picks_up_external_changes() {
    let (mut manager, store) = memory_manager();
    let mut other =
        LedgerManager::load_with_clock(Box::new(store.clone()), july_clock()).unwrap();
    other
        .add_transaction(
            &EntryInput::new(TransactionType::Income, 50.0, "Sales", "Old bike"),
            None,
        )
        .unwrap();

    assert!(manager.transactions().is_empty());
    manager.reload().unwrap();
    assert_eq!(manager.transactions().len(), 1);
}
