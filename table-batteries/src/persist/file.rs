//! JSON-file storage with in-memory cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use directories::ProjectDirs;

use crate::error::StorageError;

use super::StorageBackend;

/// File-backed storage; the local-storage counterpart of [`MemoryStorage`](super::MemoryStorage).
///
/// The whole map lives in a [`DashMap`] and is rewritten to a single JSON
/// object file after every change.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    cache: DashMap<String, String>,
    /// Serializes snapshot and write so the newest snapshot lands last.
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Open (or create) the storage file at the given path.
    ///
    /// A file that is not a JSON object of strings is logged and treated as
    /// empty; it is overwritten by the next change. Only I/O failures are errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let cache = DashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if !raw.trim().is_empty() {
                match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                    Ok(entries) => {
                        for (key, value) in entries {
                            cache.insert(key, value);
                        }
                    }
                    Err(e) => {
                        log::warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                    }
                }
            }
        } else if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    /// Open `table-state.json` in the platform data directory of the given application.
    ///
    /// - Linux: `$XDG_DATA_HOME/<application>`
    /// - macOS: `~/Library/Application Support/<qualifier>.<organization>.<application>`
    /// - Windows: `%APPDATA%\<organization>\<application>\data`
    pub fn open_default(
        qualifier: &str,
        organization: &str,
        application: &str,
    ) -> Result<Self, StorageError> {
        Self::open(Self::default_path(qualifier, organization, application)?)
    }

    /// Where [`open_default`](Self::open_default) keeps its file.
    pub fn default_path(
        qualifier: &str,
        organization: &str,
        application: &str,
    ) -> Result<PathBuf, StorageError> {
        let dirs = ProjectDirs::from(qualifier, organization, application)
            .ok_or(StorageError::NoDataDir)?;
        Ok(dirs.data_dir().join("table-state.json"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entries: BTreeMap<String, String> = self
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let raw = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn flush_or_warn(&self) {
        if let Err(e) = self.flush() {
            log::warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }
}

impl StorageBackend for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.cache.insert(key.to_string(), value);
        self.flush_or_warn();
    }

    fn remove(&self, key: &str) {
        if self.cache.remove(key).is_some() {
            self.flush_or_warn();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let storage = JsonFileStorage::open(&path).unwrap();
        storage.set("creds:pagination", r#"{"pageNumber":2}"#.to_string());
        storage.set("scratch", "1".to_string());
        storage.remove("scratch");
        drop(storage);

        let reopened = JsonFileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("creds:pagination").as_deref(),
            Some(r#"{"pageNumber":2}"#)
        );
        assert_eq!(reopened.get("scratch"), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{truncated").unwrap();

        let storage = JsonFileStorage::open(&path).unwrap();
        assert_eq!(storage.get("creds:sort"), None);

        storage.set("creds:sort", r#"{"activeSort":null}"#.to_string());
        let reopened = JsonFileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("creds:sort").as_deref(),
            Some(r#"{"activeSort":null}"#)
        );
    }

    #[test]
    fn test_concurrent_writes_keep_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let storage = Arc::new(JsonFileStorage::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for j in 0..10 {
                        storage.set(&format!("t{i}:k{j}"), j.to_string());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reopened = JsonFileStorage::open(&path).unwrap();
        for i in 0..8 {
            assert_eq!(reopened.get(&format!("t{i}:k9")).as_deref(), Some("9"));
        }
    }

    #[test]
    fn test_default_path_is_in_the_data_dir() {
        match JsonFileStorage::default_path("org", "Example", "table-batteries") {
            Ok(path) => {
                assert!(path.ends_with("table-state.json"));
                assert!(path.to_string_lossy().contains("table-batteries"));
            }
            Err(e) => assert!(matches!(e, StorageError::NoDataDir)),
        }
    }
}
