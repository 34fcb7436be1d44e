//! File-backed key-value store.
//!
//! Persists every key of the client state into one TOML document:
//!
//! ```toml
//! [entries]
//! currentPage = "3"
//! favorites = '["dog-1"]'
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use pawmatch_core::storage::KeyValueStore;
use pawmatch_core::{PawError, Result};
use serde::{Deserialize, Serialize};

use super::toml_document::TomlDocument;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredEntries {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// [`KeyValueStore`] over a [`TomlDocument`].
///
/// Reads are served from an in-memory copy loaded at open time; every write
/// goes through a locked read-modify-write of the whole file before the
/// in-memory copy is updated.
pub struct TomlKeyValueStore {
    file: TomlDocument<StoredEntries>,
    cache: RwLock<BTreeMap<String, String>>,
}

impl TomlKeyValueStore {
    /// Opens the store, tolerating a missing file.
    ///
    /// An unreadable file is logged and treated as empty so a corrupt state
    /// file never prevents startup; the next write replaces it.
    pub fn open(path: PathBuf) -> Self {
        let file = TomlDocument::<StoredEntries>::new(path);
        let entries = match file.read() {
            Ok(Some(stored)) => stored.entries,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(
                    "[TomlKeyValueStore] Ignoring unreadable state file {}: {}",
                    file.path().display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            file,
            cache: RwLock::new(entries),
        }
    }

    fn write<F>(&self, mutate: F) -> Result<()>
    where
        F: Fn(&mut BTreeMap<String, String>),
    {
        // Lock order: in-memory copy, then file
        let mut cache = self
            .cache
            .write()
            .map_err(|e| PawError::Storage(format!("state lock poisoned: {}", e)))?;

        let persisted = match self.file.modify(StoredEntries::default(), |stored| {
            mutate(&mut stored.entries);
            stored.entries.clone()
        }) {
            Ok(entries) => entries,
            Err(e) if e.is_malformed() => {
                // Corrupt on disk: rebuild from memory instead of failing forever
                tracing::warn!("[TomlKeyValueStore] Rewriting corrupt state file: {}", e);
                let mut entries = cache.clone();
                mutate(&mut entries);
                self.file.write(&StoredEntries {
                    entries: entries.clone(),
                })?;
                entries
            }
            Err(e) => return Err(e.into()),
        };

        *cache = persisted;
        Ok(())
    }
}

impl KeyValueStore for TomlKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let cache = self
            .cache
            .read()
            .map_err(|e| PawError::Storage(format!("state lock poisoned: {}", e)))?;
        Ok(cache.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.write(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");

        {
            let store = TomlKeyValueStore::open(path.clone());
            store.set("currentPage", "3").unwrap();
            store.set("favorites", r#"["dog-1"]"#).unwrap();
            store.remove("currentPage").unwrap();
        }

        let reopened = TomlKeyValueStore::open(path);
        assert_eq!(reopened.get("currentPage").unwrap(), None);
        assert_eq!(
            reopened.get("favorites").unwrap().as_deref(),
            Some(r#"["dog-1"]"#)
        );
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        std::fs::write(&path, "entries = [[[").unwrap();

        let store = TomlKeyValueStore::open(path.clone());
        assert_eq!(store.get("user").unwrap(), None);

        store.set("zipCode", "02139").unwrap();
        let reopened = TomlKeyValueStore::open(path);
        assert_eq!(reopened.get("zipCode").unwrap().as_deref(), Some("02139"));
    }
}
