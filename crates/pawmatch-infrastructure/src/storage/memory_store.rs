//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use pawmatch_core::storage::KeyValueStore;
use pawmatch_core::{PawError, Result};

/// Volatile [`KeyValueStore`] for tests and throwaway sessions.
///
/// Failure injection (`fail_writes`) lets callers exercise the paths where
/// persistence is unavailable.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, as if left behind by a previous run.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.entries.lock() {
            map.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        store
    }

    /// Makes every subsequent `set`/`remove` fail.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<()> {
        let failing = self
            .fail_writes
            .lock()
            .map_err(|e| PawError::Storage(e.to_string()))?;
        if *failing {
            return Err(PawError::Storage("storage is read-only".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PawError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PawError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PawError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        store.set("zipCode", "02139").unwrap();
        assert_eq!(store.get("zipCode").unwrap().as_deref(), Some("02139"));
        store.remove("zipCode").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_fail_writes() {
        let store = InMemoryKeyValueStore::with_entries([("currentPage", "2")]);
        store.fail_writes(true);
        assert!(store.set("currentPage", "3").is_err());
        assert!(store.remove("currentPage").is_err());
        assert_eq!(store.get("currentPage").unwrap().as_deref(), Some("2"));
    }
}
