//! Persistence adapter.
//!
//! Externalises a copy of each feature's state to a backing store: nowhere
//! (plain in-memory state), the URL query string, or a key/value storage
//! standing in for browser local/session storage. The store is never
//! authoritative; the table reads it once at construction and writes through
//! on every change.

mod file;
mod storage;
mod url_params;

pub use file::*;
pub use storage::*;
pub use url_params::*;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, KEY_DELIMITER};

/// Where table state is persisted.
#[derive(Clone, Default)]
pub enum PersistTarget {
    /// In-memory only; state resets when the table is rebuilt.
    #[default]
    State,
    /// The query string of a shared URL.
    UrlParams(UrlParams),
    /// A long-lived key/value storage.
    LocalStorage(Arc<dyn StorageBackend>),
    /// A session-scoped key/value storage.
    SessionStorage(Arc<dyn StorageBackend>),
}

impl PersistTarget {
    /// Local storage backed by a JSON file or any other backend.
    pub fn local(backend: impl StorageBackend + 'static) -> Self {
        Self::LocalStorage(Arc::new(backend))
    }

    /// Session storage backed by the given backend.
    pub fn session(backend: impl StorageBackend + 'static) -> Self {
        Self::SessionStorage(Arc::new(backend))
    }

    fn name(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::UrlParams(_) => "urlParams",
            Self::LocalStorage(_) => "localStorage",
            Self::SessionStorage(_) => "sessionStorage",
        }
    }
}

impl fmt::Debug for PersistTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a persisted value could not be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

/// A feature state that knows its persisted shapes.
///
/// Storage targets hold the whole state as JSON under [`STORAGE_KEY`]; the
/// URL target spreads it over one or more named query parameters.
///
/// [`STORAGE_KEY`]: PersistedState::STORAGE_KEY
pub trait PersistedState: Serialize + DeserializeOwned + Sized {
    /// Key of the whole state in key/value storage.
    const STORAGE_KEY: &'static str;

    /// Every query parameter this state may write.
    const URL_PARAMS: &'static [&'static str];

    /// Query parameters for this state. `None` removes the parameter.
    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)>;

    /// Rebuild from query parameters, looked up by unprefixed name.
    ///
    /// `Ok(None)` means nothing was persisted.
    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError>;
}

/// Reads and writes feature states to a [`PersistTarget`] under an optional prefix.
#[derive(Debug, Clone, Default)]
pub struct Persistence {
    target: PersistTarget,
    prefix: Option<String>,
}

impl Persistence {
    /// Create an adapter, validating the prefix.
    pub fn new(target: PersistTarget, prefix: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(prefix) = prefix {
            if prefix.is_empty() || prefix.contains(KEY_DELIMITER) {
                return Err(ConfigError::InvalidPersistencePrefix {
                    prefix: prefix.to_string(),
                });
            }
        }
        Ok(Self {
            target,
            prefix: prefix.map(str::to_string),
        })
    }

    /// The configured target.
    pub fn target(&self) -> &PersistTarget {
        &self.target
    }

    /// Namespaced key for a parameter or feature name.
    pub fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{KEY_DELIMITER}{name}"),
            None => name.to_string(),
        }
    }

    /// Restore a state, or `None` if nothing (valid) was persisted.
    ///
    /// Malformed data is logged and treated as absent.
    pub fn load<S: PersistedState>(&self) -> Option<S> {
        let result = match &self.target {
            PersistTarget::State => return None,
            PersistTarget::UrlParams(params) => {
                let get = |name: &str| params.get(&self.key(name));
                S::from_url_params(&get)
            }
            PersistTarget::LocalStorage(backend) | PersistTarget::SessionStorage(backend) => {
                match backend.get(&self.key(S::STORAGE_KEY)) {
                    Some(raw) => serde_json::from_str(&raw).map(Some).map_err(DecodeError::from),
                    None => Ok(None),
                }
            }
        };

        match result {
            Ok(state) => {
                log::trace!(
                    "Loaded {} from {:?}: {}",
                    S::STORAGE_KEY,
                    self.target,
                    if state.is_some() { "found" } else { "absent" }
                );
                state
            }
            Err(e) => {
                log::warn!(
                    "Ignoring malformed persisted {} in {:?}: {}",
                    self.key(S::STORAGE_KEY),
                    self.target,
                    e
                );
                None
            }
        }
    }

    /// Write a state through to the target.
    pub fn save<S: PersistedState>(&self, state: &S) {
        match &self.target {
            PersistTarget::State => {}
            PersistTarget::UrlParams(params) => {
                let updates: Vec<(String, Option<String>)> = state
                    .to_url_params()
                    .into_iter()
                    .map(|(name, value)| (self.key(name), value))
                    .collect();
                params.set_many(&updates);
            }
            PersistTarget::LocalStorage(backend) | PersistTarget::SessionStorage(backend) => {
                match serde_json::to_string(state) {
                    Ok(raw) => backend.set(&self.key(S::STORAGE_KEY), raw),
                    Err(e) => log::warn!("Failed to serialize {}: {}", S::STORAGE_KEY, e),
                }
            }
        }
    }

    /// Remove a state from the target.
    pub fn clear<S: PersistedState>(&self) {
        match &self.target {
            PersistTarget::State => {}
            PersistTarget::UrlParams(params) => {
                let updates: Vec<(String, Option<String>)> = S::URL_PARAMS
                    .iter()
                    .map(|name| (self.key(name), None))
                    .collect();
                params.set_many(&updates);
            }
            PersistTarget::LocalStorage(backend) | PersistTarget::SessionStorage(backend) => {
                backend.remove(&self.key(S::STORAGE_KEY));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rejects_delimiter() {
        assert_eq!(
            Persistence::new(PersistTarget::State, Some("a:b")).unwrap_err(),
            ConfigError::InvalidPersistencePrefix {
                prefix: "a:b".to_string()
            }
        );
        assert!(Persistence::new(PersistTarget::State, Some("")).is_err());
    }

    #[test]
    fn test_key_namespacing() {
        let plain = Persistence::new(PersistTarget::State, None).unwrap();
        let prefixed = Persistence::new(PersistTarget::State, Some("creds")).unwrap();
        assert_eq!(plain.key("pageNumber"), "pageNumber");
        assert_eq!(prefixed.key("pageNumber"), "creds:pageNumber");
    }
}
