#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use tally_core::{
    core::{time::FixedClock, LedgerManager},
    storage::{JsonFileStore, MemoryStore},
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Frozen at 2025-07-13 09:00 UTC.
pub fn july_clock() -> Box<FixedClock> {
    Box::new(FixedClock(
        Utc.with_ymd_and_hms(2025, 7, 13, 9, 0, 0).unwrap(),
    ))
}

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Manager over a file store in an isolated directory, plus the store root.
pub fn file_manager() -> (LedgerManager, PathBuf) {
    let root = temp_dir().join("data");
    let store = JsonFileStore::new(root.clone()).expect("create file store");
    let manager =
        LedgerManager::load_with_clock(Box::new(store), july_clock()).expect("load manager");
    (manager, root)
}

/// Reopens the file store at `root` as a second session would.
pub fn reopen(root: &PathBuf) -> LedgerManager {
    let store = JsonFileStore::new(root.clone()).expect("reopen file store");
    LedgerManager::load_with_clock(Box::new(store), july_clock()).expect("reload manager")
}

/// Manager over a shared in-memory store, plus a handle to that store.
pub fn memory_manager() -> (LedgerManager, MemoryStore) {
    let store = MemoryStore::new();
    let manager = LedgerManager::load_with_clock(Box::new(store.clone()), july_clock())
        .expect("load manager");
    (manager, store)
}
