use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::core::services::{
    CategoryService, EntryInput, ServiceError, ServiceResult, SummaryService, TransactionService,
};
use crate::core::time::{date_for_target_month, Clock, MonthKey, SystemClock};
use crate::domain::{CategoryBook, EntryMode, Settings, StorageInfo, Transaction, TransactionType};
use crate::errors::LedgerError;
use crate::ledger::Ledger;
use crate::storage::backup::{BackupDocument, BackupSections};
use crate::storage::file_store::write_atomic;
use crate::storage::{KeyValueStore, ALL_KEYS, CATEGORIES_KEY, SETTINGS_KEY, TRANSACTIONS_KEY};

/// Which persisted sections a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Transactions,
    Categories,
    Settings,
}

impl Section {
    fn key(self) -> &'static str {
        match self {
            Section::Transactions => TRANSACTIONS_KEY,
            Section::Categories => CATEGORIES_KEY,
            Section::Settings => SETTINGS_KEY,
        }
    }
}

/// Summary of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub transactions: Option<usize>,
    pub categories: Option<usize>,
    pub settings: bool,
}

/// Owns the application state and keeps it in step with the injected store.
///
/// Every mutation runs against a copy of the ledger, persists the sections it
/// changed, and only then replaces the in-memory state. A failed write leaves
/// both the store and the manager as they were.
pub struct LedgerManager {
    ledger: Ledger,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl LedgerManager {
    /// Reads every section from `storage`, seeding defaults where a key is absent.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Result<Self, LedgerError> {
        Self::load_with_clock(storage, Box::new(SystemClock))
    }

    pub fn load_with_clock(
        storage: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let mut manager = Self {
            ledger: Ledger::with_defaults(),
            storage,
            clock,
        };
        manager.reload()?;
        Ok(manager)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    pub fn categories(&self) -> &CategoryBook {
        &self.ledger.categories
    }

    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Re-reads all keys. Corrupt values are reported, never overwritten.
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        let mut transactions: Vec<Transaction> =
            self.read_section(TRANSACTIONS_KEY)?.unwrap_or_default();
        for txn in &mut transactions {
            txn.normalize();
        }

        let categories = match self.read_section::<CategoryBook>(CATEGORIES_KEY)? {
            Some(book) => book,
            None => {
                let defaults = CategoryBook::defaults();
                self.write_section(CATEGORIES_KEY, &defaults)?;
                info!("seeded default categories");
                defaults
            }
        };

        let settings: Settings = self.read_section(SETTINGS_KEY)?.unwrap_or_default();

        self.ledger = Ledger::new(transactions, categories, settings);
        debug!(
            transactions = self.ledger.transaction_count(),
            categories = self.ledger.categories.len(),
            store = %self.storage.describe(),
            "ledger loaded"
        );
        Ok(())
    }

    /// Records a transaction, dated per the target month when one is given.
    pub fn add_transaction(
        &mut self,
        input: &EntryInput,
        target_month: Option<MonthKey>,
    ) -> ServiceResult<Transaction> {
        let now = self.clock.now();
        let date = match target_month {
            Some(month) => date_for_target_month(now, month),
            None => now,
        };
        let transaction = TransactionService::draft(
            &self.ledger.settings,
            &self.ledger.categories,
            input,
            date,
        )?;
        let stored = transaction.clone();
        self.mutate(&[Section::Transactions], |ledger| {
            TransactionService::add(ledger, transaction)
        })?;
        info!(
            id = %stored.id,
            kind = %stored.kind,
            amount = stored.amount,
            "transaction added"
        );
        Ok(stored)
    }

    pub fn remove_transaction(&mut self, id: &str) -> ServiceResult<Transaction> {
        let removed = self.mutate(&[Section::Transactions], |ledger| {
            TransactionService::remove(ledger, id)
        })?;
        info!(id = %removed.id, "transaction removed");
        Ok(removed)
    }

    pub fn add_category(&mut self, kind: TransactionType, name: &str) -> ServiceResult<String> {
        let added = self.mutate(&[Section::Categories], |ledger| {
            CategoryService::add(ledger, kind, name)
        })?;
        info!(%kind, name = %added, "category added");
        Ok(added)
    }

    pub fn rename_category(
        &mut self,
        kind: TransactionType,
        current: &str,
        new_name: &str,
    ) -> ServiceResult<String> {
        let renamed = self.mutate(&[Section::Categories], |ledger| {
            CategoryService::rename(ledger, kind, current, new_name)
        })?;
        info!(%kind, from = current, to = %renamed, "category renamed");
        Ok(renamed)
    }

    /// Removes a tag; returns how many transactions still carry its name.
    pub fn remove_category(&mut self, kind: TransactionType, name: &str) -> ServiceResult<usize> {
        let orphans = self.mutate(&[Section::Categories], |ledger| {
            CategoryService::remove(ledger, kind, name)
        })?;
        if orphans > 0 {
            warn!(%kind, name, orphans, "removed category is still referenced");
        } else {
            info!(%kind, name, "category removed");
        }
        Ok(orphans)
    }

    pub fn reset_categories(&mut self) -> ServiceResult<()> {
        self.mutate(&[Section::Categories], |ledger| {
            CategoryService::reset_defaults(ledger);
            Ok(())
        })?;
        info!("categories reset to defaults");
        Ok(())
    }

    pub fn set_mode(&mut self, mode: EntryMode) -> ServiceResult<()> {
        self.mutate(&[Section::Settings], |ledger| {
            ledger.settings.mode = mode;
            Ok(())
        })?;
        info!(%mode, "entry mode changed");
        Ok(())
    }

    pub fn set_tax_percentage(&mut self, rate: f64) -> ServiceResult<()> {
        self.mutate(&[Section::Settings], |ledger| {
            ledger.settings.tax_percentage = rate;
            ledger.settings.validate().map_err(ServiceError::from)
        })?;
        info!(rate, "default tax percentage changed");
        Ok(())
    }

    pub fn storage_info(&self) -> StorageInfo {
        SummaryService::storage_info(&self.ledger.transactions, &self.ledger.categories)
    }

    pub fn backup_document(&self) -> BackupDocument {
        BackupDocument::from_ledger(&self.ledger, self.clock.now())
    }

    pub fn export_json(&self) -> Result<String, LedgerError> {
        self.backup_document().to_json()
    }

    pub fn export_to_path(&self, path: &Path) -> Result<(), LedgerError> {
        let json = self.export_json()?;
        write_atomic(path, &json)?;
        info!(path = %path.display(), "backup exported");
        Ok(())
    }

    /// Replaces the sections present in `json`. The whole document is checked
    /// before anything is written; if a write fails part-way the keys already
    /// written are restored to their previous values.
    pub fn import_json(&mut self, json: &str) -> Result<ImportReport, LedgerError> {
        let sections = BackupDocument::parse(json)?.into_sections()?;
        let BackupSections {
            transactions,
            categories,
            settings,
        } = sections;

        let mut next = self.ledger.clone();
        let mut touched = Vec::new();
        let report = ImportReport {
            transactions: transactions.as_ref().map(Vec::len),
            categories: categories.as_ref().map(CategoryBook::len),
            settings: settings.is_some(),
        };
        if let Some(settings) = settings {
            next.settings = settings;
            touched.push(Section::Settings);
        }
        if let Some(categories) = categories {
            next.categories = categories;
            touched.push(Section::Categories);
        }
        if let Some(transactions) = transactions {
            next.transactions = transactions;
            touched.push(Section::Transactions);
        }

        self.persist(&next, &touched)?;
        self.ledger = next;
        info!(
            transactions = ?report.transactions,
            categories = ?report.categories,
            settings = report.settings,
            "backup imported"
        );
        Ok(report)
    }

    pub fn import_from_path(&mut self, path: &Path) -> Result<ImportReport, LedgerError> {
        let json = std::fs::read_to_string(path)?;
        self.import_json(&json)
    }

    /// Deletes every key, then reseeds default categories and settings.
    ///
    /// All or nothing: if any key fails, the keys already touched are restored.
    pub fn clear_all(&mut self) -> Result<(), LedgerError> {
        let fresh = Ledger::with_defaults();
        let mut written: Vec<(&'static str, Option<String>)> = Vec::new();
        for key in ALL_KEYS {
            let previous = self.storage.get(key)?;
            let result = match key {
                SETTINGS_KEY => self.write_section(key, &fresh.settings),
                CATEGORIES_KEY => self.write_section(key, &fresh.categories),
                _ => self.storage.remove(key),
            };
            if let Err(err) = result {
                warn!(key, error = %err, "clear failed, restoring earlier keys");
                self.rollback(&written);
                return Err(err);
            }
            written.push((key, previous));
        }
        self.ledger = fresh;
        warn!("all stored data cleared");
        Ok(())
    }

    fn mutate<T, F>(&mut self, sections: &[Section], apply: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Ledger) -> ServiceResult<T>,
    {
        let mut next = self.ledger.clone();
        let outcome = apply(&mut next)?;
        self.persist(&next, sections)?;
        self.ledger = next;
        Ok(outcome)
    }

    fn persist(&self, next: &Ledger, sections: &[Section]) -> Result<(), LedgerError> {
        let mut written: Vec<(&'static str, Option<String>)> = Vec::new();
        for section in sections {
            let key = section.key();
            let previous = self.storage.get(key)?;
            let result = match section {
                Section::Transactions => self.write_section(key, &next.transactions),
                Section::Categories => self.write_section(key, &next.categories),
                Section::Settings => self.write_section(key, &next.settings),
            };
            if let Err(err) = result {
                warn!(key, error = %err, "write failed, restoring earlier keys");
                self.rollback(&written);
                return Err(err);
            }
            written.push((key, previous));
        }
        Ok(())
    }

    fn rollback(&self, written: &[(&'static str, Option<String>)]) {
        for (key, previous) in written.iter().rev() {
            let restored = match previous {
                Some(value) => self.storage.set(key, value),
                None => self.storage.remove(key),
            };
            if let Err(err) = restored {
                warn!(key, error = %err, "failed to restore key");
            }
        }
    }

    fn read_section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LedgerError> {
        match self.storage.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_section<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), LedgerError> {
        let json = serde_json::to_string(value)?;
        self.storage.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tax::EditedField;
    use crate::core::time::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{Datelike, TimeZone, Utc};

    fn manager_at(store: &MemoryStore, y: i32, m: u32, d: u32) -> LedgerManager {
        let clock = FixedClock(Utc.with_ymd_and_hms(y, m, d, 14, 30, 0).unwrap());
        LedgerManager::load_with_clock(Box::new(store.clone()), Box::new(clock)).unwrap()
    }

    #[test]
    fn first_load_seeds_default_categories() {
        let store = MemoryStore::new();
        let manager = manager_at(&store, 2025, 7, 13);
        assert_eq!(manager.categories(), &CategoryBook::defaults());
        assert!(store.get(CATEGORIES_KEY).unwrap().is_some());
        assert!(store.get(TRANSACTIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn add_transaction_persists_and_reloads() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        let input = EntryInput::new(TransactionType::Expense, 500.0, "Food", "Groceries");
        let added = manager.add_transaction(&input, None).unwrap();
        assert_eq!(added.date, manager.clock().now());

        let reloaded = manager_at(&store, 2025, 7, 13);
        assert_eq!(reloaded.transactions(), &[added]);
    }

    #[test]
    fn target_month_clamps_day_31() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 31);
        let input = EntryInput::new(TransactionType::Income, 10.0, "Sales", "Old sale");
        let added = manager
            .add_transaction(&input, Some(MonthKey::new(2025, 6).unwrap()))
            .unwrap();
        assert_eq!(added.date.month(), 6);
        assert_eq!(added.date.day(), 30);
    }

    #[test]
    fn professional_mode_uses_settings_rate() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        manager.set_mode(EntryMode::Professional).unwrap();
        let input = EntryInput::new(TransactionType::Income, 116.0, "Freelance", "Invoice")
            .entered_as(EditedField::Total);
        let added = manager.add_transaction(&input, None).unwrap();
        assert_eq!(added.base_amount, 100.0);
        assert_eq!(added.tax_amount, 16.0);
    }

    #[test]
    fn quota_failure_leaves_state_untouched() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        store.set_quota(Some(store.used_bytes() + 10));

        let input = EntryInput::new(TransactionType::Expense, 5.0, "Food", "Coffee beans");
        let err = manager.add_transaction(&input, None).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Ledger(LedgerError::QuotaExceeded { .. })
        ));
        assert!(manager.transactions().is_empty());
        assert!(store.get(TRANSACTIONS_KEY).unwrap().is_none());
    }

    #[test]
    fn invalid_tax_rate_is_not_saved() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        assert!(manager.set_tax_percentage(-1.0).is_err());
        assert_eq!(manager.settings().tax_percentage, 16.0);
        assert!(store.get(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn corrupt_stored_value_is_reported_not_replaced() {
        let store = MemoryStore::new();
        store.set(TRANSACTIONS_KEY, "[{broken").unwrap();
        let err = LedgerManager::load(Box::new(store.clone())).err().unwrap();
        assert!(matches!(err, LedgerError::Serde(_)));
        assert_eq!(store.get(TRANSACTIONS_KEY).unwrap().as_deref(), Some("[{broken"));
    }

    #[test]
    fn failed_import_write_rolls_back_earlier_keys() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        manager.set_tax_percentage(10.0).unwrap();
        let settings_before = store.get(SETTINGS_KEY).unwrap();

        let mut big = Ledger::with_defaults();
        big.settings.tax_percentage = 21.0;
        for n in 0..50 {
            big.add_transaction(Transaction::new(
                TransactionType::Expense,
                n as f64 + 1.0,
                "Food",
                "Bulk imported row",
                manager.clock().now(),
            ));
        }
        let json = BackupDocument::from_ledger(&big, manager.clock().now())
            .to_json()
            .unwrap();
        store.set_quota(Some(store.used_bytes() + 200));

        assert!(manager.import_json(&json).is_err());
        assert_eq!(store.get(SETTINGS_KEY).unwrap(), settings_before);
        assert_eq!(manager.settings().tax_percentage, 10.0);
        assert!(manager.transactions().is_empty());
    }

    #[test]
    fn clear_all_reseeds_defaults() {
        let store = MemoryStore::new();
        let mut manager = manager_at(&store, 2025, 7, 13);
        manager.add_category(TransactionType::Expense, "Pets").unwrap();
        manager
            .add_transaction(
                &EntryInput::new(TransactionType::Expense, 9.0, "Pets", "Dog food"),
                None,
            )
            .unwrap();
        manager.clear_all().unwrap();
        assert!(manager.transactions().is_empty());
        assert_eq!(manager.categories(), &CategoryBook::defaults());
        assert!(store.get(TRANSACTIONS_KEY).unwrap().is_none());
    }

    /// Delegates to a memory store but refuses writes to one key.
    struct FailingStore {
        inner: MemoryStore,
        fail_key: &'static str,
    }

    impl FailingStore {
        fn check(&self, key: &str) -> Result<(), LedgerError> {
            if key == self.fail_key {
                return Err(LedgerError::Storage(format!("disk refused `{key}`")));
            }
            Ok(())
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), LedgerError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    fn snapshot(store: &MemoryStore) -> Vec<(String, Option<String>)> {
        let mut keys = store.keys();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let value = store.get(&key).unwrap();
                (key, value)
            })
            .collect()
    }

    #[test]
    fn clear_all_failure_restores_every_key() {
        let store = MemoryStore::new();
        let mut seeded = manager_at(&store, 2025, 7, 13);
        seeded.set_mode(EntryMode::Professional).unwrap();
        seeded.add_category(TransactionType::Expense, "Pets").unwrap();
        seeded
            .add_transaction(
                &EntryInput::new(TransactionType::Expense, 9.0, "Pets", "Dog food"),
                None,
            )
            .unwrap();
        let before = snapshot(&store);

        let failing = FailingStore {
            inner: store.clone(),
            fail_key: TRANSACTIONS_KEY,
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 7, 13, 14, 30, 0).unwrap());
        let mut manager =
            LedgerManager::load_with_clock(Box::new(failing), Box::new(clock)).unwrap();

        let err = manager.clear_all().unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(snapshot(&store), before);
        assert_eq!(manager.transactions().len(), 1);
        assert!(manager.settings().mode.is_professional());
        assert!(manager.categories().contains(TransactionType::Expense, "Pets"));
    }
}
