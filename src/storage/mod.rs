//! Key-value persistence for the three ledger sections.

pub mod backup;
pub mod file_store;
pub mod memory;

use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

pub const TRANSACTIONS_KEY: &str = "tally_transactions";
pub const CATEGORIES_KEY: &str = "tally_categories";
pub const SETTINGS_KEY: &str = "tally_settings";

/// Every key the ledger writes, in the order an import writes them.
pub const ALL_KEYS: [&str; 3] = [SETTINGS_KEY, CATEGORIES_KEY, TRANSACTIONS_KEY];

/// String-keyed store of JSON values. Last write wins; there is no locking.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Short label for logs and `info` output.
    fn describe(&self) -> String {
        "key-value store".to_string()
    }
}

pub use backup::{BackupDocument, CategoriesPayload, BACKUP_VERSION};
pub use file_store::JsonFileStore;
pub use memory::MemoryStore;
