//! Table configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, KEY_DELIMITER};
use crate::features::{
    ActiveItemConfig, ExpandableVariant, ExpansionConfig, FilterConfig, PaginationConfig,
    SelectionConfig, SortConfig,
};
use crate::persist::PersistTarget;

/// A data column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Unique identifier for this column.
    pub key: String,
    /// Header text; also the accessible data label of its cells.
    pub label: String,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Everything a table is declared with.
///
/// Built fluently, or deserialized from a JSON table definition (the
/// persistence target is not serializable and defaults to in-memory state).
///
/// # Example
///
/// ```
/// use table_batteries::{
///     ActiveSort, Column, FilterCategory, FilterConfig, PaginationConfig, SortConfig,
///     TableConfig,
/// };
///
/// let config = TableConfig::new("credentials")
///     .column(Column::new("name", "Name"))
///     .column(Column::new("type", "Type"))
///     .filter(FilterConfig::enabled([FilterCategory::search("search_by_name", "Name")]))
///     .sort(SortConfig::enabled(["name", "type"]).initial_sort(ActiveSort::asc("name")))
///     .pagination(PaginationConfig::enabled())
///     .persistence_key_prefix("creds");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    /// Name used in log messages.
    pub table_name: String,
    /// Data columns, in display order.
    pub columns: Vec<Column>,
    pub filter: FilterConfig,
    pub sort: SortConfig,
    pub pagination: PaginationConfig,
    pub selection: SelectionConfig,
    pub expansion: ExpansionConfig,
    pub active_item: ActiveItemConfig,
    /// Whether a trailing per-row actions column is rendered.
    pub has_actions_column: bool,
    #[serde(skip)]
    pub persist_to: PersistTarget,
    /// Namespace for persisted keys; must not contain `:`.
    pub persistence_key_prefix: Option<String>,
}

impl TableConfig {
    /// Create a config with no columns and every feature disabled.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON table definition.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Append a column.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: SortConfig) -> Self {
        self.sort = sort;
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn expansion(mut self, expansion: ExpansionConfig) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn active_item(mut self, active_item: ActiveItemConfig) -> Self {
        self.active_item = active_item;
        self
    }

    /// Render a trailing actions column.
    pub fn with_actions_column(mut self) -> Self {
        self.has_actions_column = true;
        self
    }

    /// Set the persistence target.
    pub fn persist_to(mut self, target: PersistTarget) -> Self {
        self.persist_to = target;
        self
    }

    /// Set the persistence key prefix.
    pub fn persistence_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.persistence_key_prefix = Some(prefix.into());
        self
    }

    /// Look up a column by key.
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub(crate) fn require_column(&self, key: &str) -> Result<(), ConfigError> {
        match self.column_by_key(key) {
            Some(_) => Ok(()),
            None => Err(ConfigError::UnknownColumn(key.to_string())),
        }
    }

    /// Check the declaration for programming mistakes.
    ///
    /// Disabled features are not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.key.clone()));
            }
        }

        if self.filter.is_enabled {
            self.filter.validate()?;
        }

        if self.sort.is_enabled {
            for key in &self.sort.sortable_columns {
                self.require_column(key)?;
            }
            self.sort.validate()?;
        }

        if self.pagination.is_enabled {
            self.pagination.validate()?;
        }

        if let Some(prefix) = &self.persistence_key_prefix {
            if prefix.is_empty() || prefix.contains(KEY_DELIMITER) {
                return Err(ConfigError::InvalidPersistencePrefix {
                    prefix: prefix.clone(),
                });
            }
        }

        Ok(())
    }

    /// Number of columns a full-width row must span.
    ///
    /// Data columns, plus one each for the selection checkbox, the
    /// single-expand toggle and the actions column when present.
    pub fn num_rendered_columns(&self) -> usize {
        self.columns.len()
            + usize::from(self.selection.is_enabled)
            + usize::from(
                self.expansion.is_enabled && self.expansion.variant == ExpandableVariant::Single,
            )
            + usize::from(self.has_actions_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ActiveSort, FilterCategory};

    fn base() -> TableConfig {
        TableConfig::new("sources").columns([
            Column::new("name", "Name"),
            Column::new("type", "Type"),
            Column::new("credentials", "Credentials"),
        ])
    }

    #[test]
    fn test_sortable_columns_must_be_declared() {
        let config = base().sort(SortConfig::enabled(["name", "scan"]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownColumn("scan".into()))
        );
    }

    #[test]
    fn test_initial_sort_must_be_sortable() {
        let config = base().sort(SortConfig::enabled(["name"]).initial_sort(ActiveSort::asc("type")));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownSortColumn("type".into()))
        );
    }

    #[test]
    fn test_prefix_with_delimiter_is_rejected() {
        let config = base().persistence_key_prefix("a:b");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPersistencePrefix { .. })
        ));
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let config = base().column(Column::new("name", "Again"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateColumn("name".into()))
        );
    }

    #[test]
    fn test_num_rendered_columns() {
        assert_eq!(base().num_rendered_columns(), 3);
        let config = base()
            .selection(SelectionConfig::enabled())
            .expansion(ExpansionConfig::single())
            .with_actions_column();
        assert_eq!(config.num_rendered_columns(), 6);
        let compound = base().expansion(ExpansionConfig::compound());
        assert_eq!(compound.num_rendered_columns(), 3);
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{
            "tableName": "scans",
            "columns": [{"key": "name", "label": "Name"}, {"key": "last_scanned", "label": "Last scanned"}],
            "filter": {"isEnabled": true, "categories": [{"key": "search_by_name", "title": "Name", "type": "search"}]},
            "sort": {"isEnabled": true, "sortableColumns": ["name"], "initialSort": {"columnKey": "name", "direction": "desc"}},
            "pagination": {"isEnabled": true, "initialItemsPerPage": 20},
            "persistenceKeyPrefix": "scans"
        }"#;
        let config = TableConfig::from_json(raw).unwrap();
        assert_eq!(config.columns.len(), 2);
        assert_eq!(
            config.filter.categories[0],
            FilterCategory::search("search_by_name", "Name")
        );
        assert_eq!(config.sort.initial_sort, Some(ActiveSort::desc("name")));
        assert_eq!(config.pagination.initial_items_per_page, 20);
        assert_eq!(config.pagination.per_page_options, vec![10, 20, 50, 100]);
        assert!(config.validate().is_ok());
    }
}
