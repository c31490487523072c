//! Sort feature: the active sort column and direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persist::{DecodeError, PersistedState};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DecodeError(format!("invalid sort direction '{other}'"))),
        }
    }
}

/// A column and the direction it is sorted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSort {
    pub column_key: String,
    pub direction: SortDirection,
}

impl ActiveSort {
    /// Ascending sort on a column.
    pub fn asc(column_key: impl Into<String>) -> Self {
        Self {
            column_key: column_key.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on a column.
    pub fn desc(column_key: impl Into<String>) -> Self {
        Self {
            column_key: column_key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort feature configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortConfig {
    pub is_enabled: bool,
    /// Allow-list of column keys that may be sorted.
    pub sortable_columns: Vec<String>,
    pub initial_sort: Option<ActiveSort>,
}

impl SortConfig {
    /// An enabled sort feature over the given columns.
    pub fn enabled<I, S>(sortable_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_enabled: true,
            sortable_columns: sortable_columns.into_iter().map(Into::into).collect(),
            initial_sort: None,
        }
    }

    /// Set the sort applied when nothing is persisted.
    pub fn initial_sort(mut self, sort: ActiveSort) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    /// Whether a column is in the allow-list.
    pub fn is_sortable(&self, column_key: &str) -> bool {
        self.sortable_columns.iter().any(|c| c == column_key)
    }

    pub(crate) fn require_sortable(&self, column_key: &str) -> Result<(), ConfigError> {
        if self.is_sortable(column_key) {
            Ok(())
        } else {
            Err(ConfigError::UnknownSortColumn(column_key.to_string()))
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match &self.initial_sort {
            Some(sort) => self.require_sortable(&sort.column_key),
            None => Ok(()),
        }
    }
}

/// The active sort, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    active_sort: Option<ActiveSort>,
}

impl SortState {
    /// Initial state for a config.
    pub fn new(config: &SortConfig) -> Self {
        Self {
            active_sort: config.initial_sort.clone(),
        }
    }

    /// The active sort.
    pub fn active_sort(&self) -> Option<&ActiveSort> {
        self.active_sort.as_ref()
    }

    /// Replace the active sort. Returns true if it changed.
    ///
    /// A column outside the allow-list is rejected and leaves the state untouched.
    pub fn set_active_sort(
        &mut self,
        config: &SortConfig,
        sort: ActiveSort,
    ) -> Result<bool, ConfigError> {
        config.require_sortable(&sort.column_key)?;
        if self.active_sort.as_ref() == Some(&sort) {
            return Ok(false);
        }
        self.active_sort = Some(sort);
        Ok(true)
    }

    /// Remove the active sort. Returns true if there was one.
    pub fn clear_active_sort(&mut self) -> bool {
        self.active_sort.take().is_some()
    }

    /// The sort a header click on `column_key` requests.
    ///
    /// The active column flips direction; any other column sorts ascending.
    pub fn next_sort_for(&self, column_key: &str) -> ActiveSort {
        match &self.active_sort {
            Some(active) if active.column_key == column_key => ActiveSort {
                column_key: column_key.to_string(),
                direction: active.direction.toggled(),
            },
            _ => ActiveSort::asc(column_key),
        }
    }

    /// Whether the stored sort is still allowed; used after loading.
    pub(crate) fn is_valid_for(&self, config: &SortConfig) -> bool {
        match &self.active_sort {
            Some(sort) => config.is_sortable(&sort.column_key),
            None => true,
        }
    }
}

impl PersistedState for SortState {
    const STORAGE_KEY: &'static str = "sort";
    const URL_PARAMS: &'static [&'static str] = &["sortColumn", "sortDirection"];

    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)> {
        match &self.active_sort {
            Some(sort) => vec![
                ("sortColumn", Some(sort.column_key.clone())),
                ("sortDirection", Some(sort.direction.as_str().to_string())),
            ],
            None => vec![
                ("sortColumn", Some(String::new())),
                ("sortDirection", Some(String::new())),
            ],
        }
    }

    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError> {
        match (get("sortColumn"), get("sortDirection")) {
            (None, None) => Ok(None),
            (Some(column_key), Some(direction)) if column_key.is_empty() && direction.is_empty() => {
                Ok(Some(Self { active_sort: None }))
            }
            (Some(column_key), Some(direction)) => Ok(Some(Self {
                active_sort: Some(ActiveSort {
                    column_key,
                    direction: direction.parse()?,
                }),
            })),
            _ => Err(DecodeError(
                "sortColumn and sortDirection must be set together".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SortConfig {
        SortConfig::enabled(["name", "type"]).initial_sort(ActiveSort::asc("name"))
    }

    #[test]
    fn test_set_active_sort() {
        let config = config();
        let mut state = SortState::new(&config);
        assert!(state
            .set_active_sort(&config, ActiveSort::desc("type"))
            .unwrap());
        assert_eq!(state.active_sort(), Some(&ActiveSort::desc("type")));
        assert!(!state
            .set_active_sort(&config, ActiveSort::desc("type"))
            .unwrap());
    }

    #[test]
    fn test_column_outside_allow_list_is_rejected() {
        let config = config();
        let mut state = SortState::new(&config);
        assert_eq!(
            state.set_active_sort(&config, ActiveSort::asc("credential")),
            Err(ConfigError::UnknownSortColumn("credential".into()))
        );
        assert_eq!(state.active_sort(), Some(&ActiveSort::asc("name")));
    }

    #[test]
    fn test_invalid_initial_sort() {
        let config = SortConfig::enabled(["name"]).initial_sort(ActiveSort::asc("type"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownSortColumn("type".into()))
        );
    }

    #[test]
    fn test_next_sort_for() {
        let state = SortState::new(&config());
        assert_eq!(state.next_sort_for("name"), ActiveSort::desc("name"));
        assert_eq!(state.next_sort_for("type"), ActiveSort::asc("type"));
    }

    #[test]
    fn test_url_params_need_both_halves() {
        let get = |name: &str| (name == "sortColumn").then(|| "name".to_string());
        assert!(SortState::from_url_params(&get).is_err());

        let bad_direction = |name: &str| match name {
            "sortColumn" => Some("name".to_string()),
            _ => Some("sideways".to_string()),
        };
        assert!(SortState::from_url_params(&bad_direction).is_err());
    }

    #[test]
    fn test_cleared_sort_is_written_as_empty_params() {
        let mut state = SortState::new(&config());
        state.clear_active_sort();

        let params = state.to_url_params();
        assert_eq!(
            params,
            vec![
                ("sortColumn", Some(String::new())),
                ("sortDirection", Some(String::new())),
            ]
        );

        let get = |name: &str| {
            params
                .iter()
                .find(|(key, _)| *key == name)
                .and_then(|(_, value)| value.clone())
        };
        assert_eq!(SortState::from_url_params(&get), Ok(Some(state)));
    }
}
