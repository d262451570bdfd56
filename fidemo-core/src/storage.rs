//! Key-value persistence for the cached demo dataset
//!
//! The adapter persists two JSON strings, the manifest and the summaries,
//! under a pair of namespaced keys. Any [`KeyValueStore`] can back it:
//! [`MemoryStore`] for tests and short-lived processes, or
//! [`crate::db::SqliteStore`] for a cache that survives restarts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Default key namespace
pub const DEFAULT_NAMESPACE: &str = "fi-demo";

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// The two keys the dataset is persisted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub manifest: String,
    pub summaries: String,
}

impl StorageKeys {
    /// Keys `"<namespace>:manifest"` and `"<namespace>:summaries"`.
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            manifest: format!("{}:manifest", namespace),
            summaries: format!("{}:summaries", namespace),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::namespaced(DEFAULT_NAMESPACE)
    }
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_arc_store_shares_entries() {
        let shared = Arc::new(MemoryStore::new());
        let handle = Arc::clone(&shared);
        handle.set("k", "v").unwrap();
        assert_eq!(shared.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_namespaced_keys() {
        let keys = StorageKeys::namespaced("tenant-7");
        assert_eq!(keys.manifest, "tenant-7:manifest");
        assert_eq!(keys.summaries, "tenant-7:summaries");
        assert_eq!(StorageKeys::default(), StorageKeys::namespaced("fi-demo"));
    }
}
