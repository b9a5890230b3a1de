use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::errors::LedgerError;

use super::{KeyValueStore, Result};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl Inner {
    fn used_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

/// In-process store. Clones share the same contents, so a test can keep a
/// handle while a manager owns another.
///
/// An optional quota caps the total bytes of keys plus values; a write that
/// would exceed it fails with [`LedgerError::QuotaExceeded`] and changes nothing.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        let store = Self::default();
        store.set_quota(Some(limit));
        store
    }

    pub fn set_quota(&self, limit: Option<usize>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.quota = limit;
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.lock().map(|inner| inner.used_without("")).unwrap_or(0)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .map(|inner| inner.values.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(limit) = inner.quota {
            let needed = inner.used_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(LedgerError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.values.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.set("a", "1").unwrap();
        assert_eq!(handle.get("a").unwrap().as_deref(), Some("1"));
        handle.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn quota_rejects_oversized_write_without_mutation() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();
        let err = store.set("k", "1234567890").unwrap_err();
        assert!(matches!(err, LedgerError::QuotaExceeded { limit: 10, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("12345"));
        assert_eq!(store.used_bytes(), 6);
    }

    #[test]
    fn overwrite_only_counts_new_value() {
        let store = MemoryStore::with_quota(8);
        store.set("k", "1234567").unwrap();
        store.set("k", "7654321").unwrap();
        assert_eq!(store.keys(), vec!["k".to_string()]);
    }
}
