//! Durable client storage contract.
//!
//! The session and search engines persist each logical field under its own
//! key. Writes are synchronous and overwrite the whole value.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Logical keys of persisted client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistedKey {
    /// Authenticated user's credentials (JSON)
    User,
    /// Current filter (JSON)
    SearchFilters,
    /// Current page number (decimal string)
    CurrentPage,
    /// Favorite id set (JSON array)
    Favorites,
    /// Last accepted ZIP code input
    ZipCode,
}

impl PersistedKey {
    /// Every key, in the order logout clears them.
    pub const ALL: [PersistedKey; 5] = [
        PersistedKey::User,
        PersistedKey::Favorites,
        PersistedKey::SearchFilters,
        PersistedKey::CurrentPage,
        PersistedKey::ZipCode,
    ];

    /// Keys reset by "clear all" (favorites and user survive).
    pub const SEARCH: [PersistedKey; 3] = [
        PersistedKey::SearchFilters,
        PersistedKey::CurrentPage,
        PersistedKey::ZipCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersistedKey::User => "user",
            PersistedKey::SearchFilters => "searchFilters",
            PersistedKey::CurrentPage => "currentPage",
            PersistedKey::Favorites => "favorites",
            PersistedKey::ZipCode => "zipCode",
        }
    }
}

/// String key-value storage injected into the engines.
///
/// Implementations must make each `set`/`remove` durable before returning.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed helpers over [`KeyValueStore`] for [`PersistedKey`]s.
pub trait KeyValueStoreExt: KeyValueStore {
    fn read_raw(&self, key: PersistedKey) -> Result<Option<String>> {
        self.get(key.as_str())
    }

    fn write_raw(&self, key: PersistedKey, value: &str) -> Result<()> {
        self.set(key.as_str(), value)
    }

    fn write_json<T: Serialize>(&self, key: PersistedKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set(key.as_str(), &json)
    }

    /// Reads and decodes a JSON value.
    ///
    /// Missing keys yield `Ok(None)`; undecodable values yield the
    /// serialization error so callers can decide whether to discard them.
    fn read_json<T: DeserializeOwned>(&self, key: PersistedKey) -> Result<Option<T>> {
        match self.get(key.as_str())? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn clear(&self, key: PersistedKey) -> Result<()> {
        self.remove(key.as_str())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
