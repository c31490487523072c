//! Key/value backing stores standing in for browser local/session storage.

use dashmap::DashMap;

/// Backend trait for key/value storage.
///
/// Values are JSON strings written by the persistence adapter. Writes are
/// infallible from the caller's point of view; implementations that can fail
/// log and carry on.
pub trait StorageBackend: Send + Sync {
    /// Get the raw value stored for a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a raw value for a key.
    fn set(&self, key: &str, value: String);

    /// Delete a key.
    fn remove(&self, key: &str);
}

/// An in-memory storage backed by a concurrent hash map.
///
/// Data lives as long as the process, which is the lifetime of a browser
/// session storage. Use [`JsonFileStorage`](super::JsonFileStorage) for
/// state that should survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: DashMap<String, String>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.store.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.store.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.store.remove(key);
    }
}
