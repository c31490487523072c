//! Filter feature: active filter values keyed by category.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persist::{DecodeError, PersistedState};

/// Filter values keyed by category, each an ordered list of strings.
pub type FilterValues = BTreeMap<String, Vec<String>>;

/// How a category is edited and matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Free text.
    #[default]
    Search,
    /// One or more values from a fixed option list.
    Select,
}

/// An option of a `select` category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl SelectOption {
    /// Create an option whose key and value are the same.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            key: value.clone(),
            label: label.into(),
            value,
        }
    }
}

/// A declared filter category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCategory {
    /// Unique key; also the key in [`FilterValues`].
    pub key: String,
    /// Display title.
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: FilterKind,
    #[serde(default)]
    pub select_options: Vec<SelectOption>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FilterCategory {
    /// Create a free-text category.
    pub fn search(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: FilterKind::Search,
            select_options: Vec::new(),
            placeholder: None,
        }
    }

    /// Create a multi-value category with a fixed option list.
    pub fn select(
        key: impl Into<String>,
        title: impl Into<String>,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: FilterKind::Select,
            select_options: options.into_iter().collect(),
            placeholder: None,
        }
    }

    /// Set the placeholder shown in an empty filter control.
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

/// Filter feature configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub is_enabled: bool,
    pub categories: Vec<FilterCategory>,
    /// Values applied when nothing is persisted.
    pub initial_values: FilterValues,
}

impl FilterConfig {
    /// An enabled filter feature with the given categories.
    pub fn enabled(categories: impl IntoIterator<Item = FilterCategory>) -> Self {
        Self {
            is_enabled: true,
            categories: categories.into_iter().collect(),
            initial_values: FilterValues::new(),
        }
    }

    /// Set the initial values.
    pub fn initial_values(mut self, values: FilterValues) -> Self {
        self.initial_values = values;
        self
    }

    /// Look up a declared category.
    pub fn category(&self, key: &str) -> Option<&FilterCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.key.as_str()) {
                return Err(ConfigError::DuplicateFilterCategory(category.key.clone()));
            }
        }
        for key in self.initial_values.keys() {
            self.require_category(key)?;
        }
        Ok(())
    }

    fn require_category(&self, key: &str) -> Result<(), ConfigError> {
        match self.category(key) {
            Some(_) => Ok(()),
            None => Err(ConfigError::UnknownFilterCategory(key.to_string())),
        }
    }
}

/// Active filter values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: FilterValues,
}

impl FilterState {
    /// Initial state for a config.
    pub fn new(config: &FilterConfig) -> Self {
        let mut state = Self::default();
        for (key, values) in &config.initial_values {
            state.insert(key, values.clone());
        }
        state
    }

    /// All active values.
    pub fn values(&self) -> &FilterValues {
        &self.values
    }

    /// Values for one category; empty if none.
    pub fn get(&self, category_key: &str) -> &[String] {
        self.values
            .get(category_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any category has a non-empty value list.
    pub fn is_filter_active(&self) -> bool {
        self.values.values().any(|values| !values.is_empty())
    }

    /// Replace the values of a category. Returns true if anything changed.
    pub fn set_filter_value(
        &mut self,
        config: &FilterConfig,
        category_key: &str,
        values: Vec<String>,
    ) -> Result<bool, ConfigError> {
        config.require_category(category_key)?;
        let before = self.values.get(category_key).cloned();
        self.insert(category_key, values);
        Ok(before != self.values.get(category_key).cloned())
    }

    /// Clear one category. Returns true if anything changed.
    pub fn clear_filter(
        &mut self,
        config: &FilterConfig,
        category_key: &str,
    ) -> Result<bool, ConfigError> {
        config.require_category(category_key)?;
        Ok(self.values.remove(category_key).is_some())
    }

    /// Clear every category. Returns true if anything changed.
    pub fn clear_all_filters(&mut self) -> bool {
        let changed = !self.values.is_empty();
        self.values.clear();
        changed
    }

    /// Drop values for categories that are not declared.
    pub(crate) fn retain_declared(&mut self, config: &FilterConfig) {
        self.values.retain(|key, _| {
            let declared = config.category(key).is_some();
            if !declared {
                log::warn!("Dropping persisted filter for unknown category '{}'", key);
            }
            declared
        });
    }

    fn insert(&mut self, key: &str, values: Vec<String>) {
        if values.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), values);
        }
    }
}

impl PersistedState for FilterState {
    const STORAGE_KEY: &'static str = "filters";
    const URL_PARAMS: &'static [&'static str] = &["filters"];

    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![("filters", serde_json::to_string(&self.values).ok())]
    }

    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError> {
        let Some(raw) = get("filters") else {
            return Ok(None);
        };
        let values: FilterValues = serde_json::from_str(&raw)?;
        let mut state = Self::default();
        for (key, values) in values {
            state.insert(&key, values);
        }
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FilterConfig {
        FilterConfig::enabled([
            FilterCategory::search("search_by_name", "Name"),
            FilterCategory::select(
                "cred_type",
                "Type",
                [
                    SelectOption::new("network", "Network"),
                    SelectOption::new("vcenter", "vCenter"),
                ],
            ),
        ])
    }

    #[test]
    fn test_set_and_clear() {
        let config = config();
        let mut state = FilterState::new(&config);
        assert!(!state.is_filter_active());

        assert!(state
            .set_filter_value(&config, "search_by_name", vec!["abc".into()])
            .unwrap());
        assert!(state.is_filter_active());
        assert_eq!(state.get("search_by_name"), ["abc".to_string()]);

        assert!(!state
            .set_filter_value(&config, "search_by_name", vec!["abc".into()])
            .unwrap());

        assert!(state.clear_filter(&config, "search_by_name").unwrap());
        assert!(!state.is_filter_active());
    }

    #[test]
    fn test_empty_values_remove_the_key() {
        let config = config();
        let mut state = FilterState::new(&config);
        state
            .set_filter_value(&config, "cred_type", vec!["network".into()])
            .unwrap();
        state.set_filter_value(&config, "cred_type", vec![]).unwrap();
        assert!(state.values().is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let config = config();
        let mut state = FilterState::new(&config);
        assert_eq!(
            state.set_filter_value(&config, "nope", vec!["x".into()]),
            Err(ConfigError::UnknownFilterCategory("nope".into()))
        );
        assert!(state.values().is_empty());
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let config = FilterConfig::enabled([
            FilterCategory::search("name", "Name"),
            FilterCategory::search("name", "Name again"),
        ]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateFilterCategory("name".into()))
        );
    }

    #[test]
    fn test_retain_declared_drops_unknown_keys() {
        let config = config();
        let mut values = FilterValues::new();
        values.insert("cred_type".into(), vec!["network".into()]);
        values.insert("legacy".into(), vec!["x".into()]);
        let mut state: FilterState =
            serde_json::from_value(serde_json::to_value(&values).unwrap()).unwrap();
        state.retain_declared(&config);
        assert_eq!(state.values().len(), 1);
    }

    #[test]
    fn test_cleared_filters_are_written_as_empty_object() {
        let mut values = FilterValues::new();
        values.insert("cred_type".into(), vec!["network".into()]);
        let config = config().initial_values(values);
        let mut state = FilterState::new(&config);
        state.clear_all_filters();

        assert_eq!(state.to_url_params(), vec![("filters", Some("{}".to_string()))]);

        let get = |name: &str| (name == "filters").then(|| "{}".to_string());
        assert_eq!(FilterState::from_url_params(&get), Ok(Some(FilterState::default())));
    }
}
