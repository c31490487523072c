//! Active item feature: the one row whose details are open.

use serde::{Deserialize, Serialize};

use crate::item::ItemKey;
use crate::persist::{DecodeError, PersistedState};

/// Active item feature configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveItemConfig {
    pub is_enabled: bool,
}

impl ActiveItemConfig {
    pub fn enabled() -> Self {
        Self { is_enabled: true }
    }
}

/// The active item's key, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveItemState<K> {
    active: Option<K>,
}

impl<K> Default for ActiveItemState<K> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<K: ItemKey> ActiveItemState<K> {
    pub fn active_item(&self) -> Option<&K> {
        self.active.as_ref()
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.active.as_ref() == Some(key)
    }

    /// Set or clear the active item. Returns true if it changed.
    pub fn set_active_item(&mut self, key: Option<K>) -> bool {
        if self.active == key {
            return false;
        }
        self.active = key;
        true
    }
}

impl<K: ItemKey> PersistedState for ActiveItemState<K> {
    const STORAGE_KEY: &'static str = "activeItem";
    const URL_PARAMS: &'static [&'static str] = &["activeItem"];

    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)> {
        let value = self
            .active
            .as_ref()
            .and_then(|key| serde_json::to_string(key).ok());
        vec![("activeItem", value)]
    }

    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError> {
        match get("activeItem") {
            Some(raw) => Ok(Some(Self {
                active: Some(serde_json::from_str(&raw)?),
            })),
            None => Ok(None),
        }
    }
}
