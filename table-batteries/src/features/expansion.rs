//! Expansion feature: which rows, or which row sections, are expanded.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::item::{ItemKey, TableItem};
use crate::persist::{DecodeError, PersistedState};

/// How rows expand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpandableVariant {
    /// One expanded row at a time, toggled from its own column.
    #[default]
    Single,
    /// Per row, one of several column sections expanded at a time.
    Compound,
}

impl ExpandableVariant {
    fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Compound => "compound",
        }
    }
}

/// Expansion feature configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpansionConfig {
    pub is_enabled: bool,
    pub variant: ExpandableVariant,
}

impl ExpansionConfig {
    /// Enabled single-row expansion.
    pub fn single() -> Self {
        Self {
            is_enabled: true,
            variant: ExpandableVariant::Single,
        }
    }

    /// Enabled compound (row + column) expansion.
    pub fn compound() -> Self {
        Self {
            is_enabled: true,
            variant: ExpandableVariant::Compound,
        }
    }
}

/// One expanded row, with the expanded column in compound mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedCell<K> {
    pub item: K,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_key: Option<String>,
}

/// Expanded rows in expansion order.
///
/// Holds at most one entry per item. In single mode it holds at most one
/// entry overall and entries carry no column; in compound mode every entry
/// names a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState<K: ItemKey> {
    variant: ExpandableVariant,
    expanded: Vec<ExpandedCell<K>>,
}

impl<K: ItemKey> Default for ExpansionState<K> {
    fn default() -> Self {
        Self::new(ExpandableVariant::Single)
    }
}

impl<K: ItemKey> ExpansionState<K> {
    pub fn new(variant: ExpandableVariant) -> Self {
        Self {
            variant,
            expanded: Vec::new(),
        }
    }

    pub fn variant(&self) -> ExpandableVariant {
        self.variant
    }

    /// Expanded cells in expansion order.
    pub fn cells(&self) -> &[ExpandedCell<K>] {
        &self.expanded
    }

    /// The expanded row in single mode.
    pub fn expanded_item(&self) -> Option<&K> {
        match self.variant {
            ExpandableVariant::Single => self.expanded.first().map(|cell| &cell.item),
            ExpandableVariant::Compound => None,
        }
    }

    /// Whether a row is expanded (any column, in compound mode).
    pub fn is_expanded(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// The expanded column of a row in compound mode.
    pub fn expanded_column(&self, key: &K) -> Option<&str> {
        self.position(key)
            .and_then(|i| self.expanded[i].column_key.as_deref())
    }

    /// Whether a specific (row, column) cell is expanded.
    pub fn is_cell_expanded(&self, key: &K, column_key: &str) -> bool {
        self.expanded_column(key) == Some(column_key)
    }

    /// Single mode: expand `key`, collapsing any other row, or collapse all with `None`.
    pub fn set_expanded_item(&mut self, key: Option<K>) -> Result<bool, ConfigError> {
        self.require(ExpandableVariant::Single)?;
        let current = self.expanded.first().map(|cell| &cell.item);
        if current == key.as_ref() {
            return Ok(false);
        }
        self.expanded.clear();
        if let Some(item) = key {
            self.expanded.push(ExpandedCell {
                item,
                column_key: None,
            });
        }
        Ok(true)
    }

    /// Single mode: expand a collapsed row or collapse an expanded one.
    pub fn toggle_expanded(&mut self, key: K) -> Result<bool, ConfigError> {
        self.require(ExpandableVariant::Single)?;
        if self.is_expanded(&key) {
            self.set_expanded_item(None)
        } else {
            self.set_expanded_item(Some(key))
        }
    }

    /// Compound mode: toggle a (row, column) cell.
    ///
    /// The expanded cell collapses; another column of the same row takes its place.
    pub fn set_cell_expanded(&mut self, key: K, column_key: &str) -> Result<bool, ConfigError> {
        self.require(ExpandableVariant::Compound)?;
        match self.position(&key) {
            Some(i) if self.expanded[i].column_key.as_deref() == Some(column_key) => {
                self.expanded.remove(i);
            }
            Some(i) => {
                self.expanded[i].column_key = Some(column_key.to_string());
            }
            None => self.expanded.push(ExpandedCell {
                item: key,
                column_key: Some(column_key.to_string()),
            }),
        }
        Ok(true)
    }

    /// Compound mode: collapse whatever is expanded in a row.
    pub fn collapse_cell(&mut self, key: &K) -> Result<bool, ConfigError> {
        self.require(ExpandableVariant::Compound)?;
        Ok(self.remove(key))
    }

    /// Collapse everything, in either mode.
    pub fn collapse_all(&mut self) -> bool {
        let changed = !self.expanded.is_empty();
        self.expanded.clear();
        changed
    }

    pub fn is_item_expanded<T>(&self, item: &T) -> bool
    where
        T: TableItem<Key = K>,
    {
        self.is_expanded(&item.key())
    }

    /// Adopt the configured variant, dropping entries that do not fit it.
    pub(crate) fn reconcile(mut self, variant: ExpandableVariant) -> Self {
        self.variant = variant;
        let before = self.expanded.len();
        match variant {
            ExpandableVariant::Single => {
                self.expanded.retain(|cell| cell.column_key.is_none());
                self.expanded.truncate(1);
            }
            ExpandableVariant::Compound => {
                self.expanded.retain(|cell| cell.column_key.is_some());
            }
        }
        if self.expanded.len() != before {
            log::warn!(
                "Dropped {} persisted expansion entries not valid in {} mode",
                before - self.expanded.len(),
                variant.name()
            );
        }
        self
    }

    pub(crate) fn retain_columns(&mut self, is_declared: impl Fn(&str) -> bool) {
        self.expanded.retain(|cell| match &cell.column_key {
            Some(column) => is_declared(column),
            None => true,
        });
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.position(key) {
            Some(i) => {
                self.expanded.remove(i);
                true
            }
            None => false,
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.expanded.iter().position(|cell| &cell.item == key)
    }

    fn require(&self, expected: ExpandableVariant) -> Result<(), ConfigError> {
        if self.variant == expected {
            Ok(())
        } else {
            Err(ConfigError::ExpansionMode {
                expected: expected.name(),
            })
        }
    }
}

impl<K: ItemKey> Serialize for ExpansionState<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.expanded.serialize(serializer)
    }
}

impl<'de, K: ItemKey> Deserialize<'de> for ExpansionState<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cells = Vec::<ExpandedCell<K>>::deserialize(deserializer)?;
        let mut expanded: Vec<ExpandedCell<K>> = Vec::with_capacity(cells.len());
        for cell in cells {
            // Last entry per item wins.
            expanded.retain(|existing| existing.item != cell.item);
            expanded.push(cell);
        }
        let variant = if expanded.iter().any(|cell| cell.column_key.is_some()) {
            ExpandableVariant::Compound
        } else {
            ExpandableVariant::Single
        };
        Ok(Self { variant, expanded })
    }
}

impl<K: ItemKey> PersistedState for ExpansionState<K> {
    const STORAGE_KEY: &'static str = "expandedCells";
    const URL_PARAMS: &'static [&'static str] = &["expandedCells"];

    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)> {
        let value = if self.expanded.is_empty() {
            None
        } else {
            serde_json::to_string(&self.expanded).ok()
        };
        vec![("expandedCells", value)]
    }

    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError> {
        match get("expandedCells") {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_expand_collapses_previous() {
        let mut state = ExpansionState::new(ExpandableVariant::Single);
        state.set_expanded_item(Some(1u32)).unwrap();
        state.set_expanded_item(Some(2u32)).unwrap();
        assert_eq!(state.expanded_item(), Some(&2));
        assert!(!state.is_expanded(&1));

        assert!(state.toggle_expanded(2).unwrap());
        assert_eq!(state.expanded_item(), None);
    }

    #[test]
    fn test_compound_switches_and_collapses() {
        let mut state = ExpansionState::new(ExpandableVariant::Compound);
        state.set_cell_expanded(1u32, "sources").unwrap();
        state.set_cell_expanded(1u32, "jobs").unwrap();
        assert!(state.is_cell_expanded(&1, "jobs"));
        assert!(!state.is_cell_expanded(&1, "sources"));

        state.set_cell_expanded(2u32, "sources").unwrap();
        assert!(state.is_cell_expanded(&1, "jobs"));
        assert!(state.is_cell_expanded(&2, "sources"));

        state.set_cell_expanded(1u32, "jobs").unwrap();
        assert!(!state.is_expanded(&1));
        assert!(state.collapse_cell(&2).unwrap());
        assert!(state.cells().is_empty());
    }

    #[test]
    fn test_wrong_mode_is_rejected() {
        let mut single = ExpansionState::<u32>::new(ExpandableVariant::Single);
        assert_eq!(
            single.set_cell_expanded(1, "jobs"),
            Err(ConfigError::ExpansionMode {
                expected: "compound"
            })
        );
        let mut compound = ExpansionState::<u32>::new(ExpandableVariant::Compound);
        assert!(compound.set_expanded_item(Some(1)).is_err());
    }

    #[test]
    fn test_reconcile_drops_foreign_entries() {
        let raw = r#"[{"item":1,"columnKey":"jobs"},{"item":2}]"#;
        let state: ExpansionState<u32> = serde_json::from_str(raw).unwrap();
        let compound = state.clone().reconcile(ExpandableVariant::Compound);
        assert_eq!(compound.cells().len(), 1);
        let single = state.reconcile(ExpandableVariant::Single);
        assert_eq!(single.expanded_item(), Some(&2));
    }

    struct Job(u32);

    impl TableItem for Job {
        type Key = u32;

        fn key(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_collapse_all() {
        let mut state = ExpansionState::new(ExpandableVariant::Compound);
        state.set_cell_expanded(1u32, "sources").unwrap();
        state.set_cell_expanded(2u32, "jobs").unwrap();
        assert!(state.is_item_expanded(&Job(2)));

        assert!(state.collapse_all());
        assert!(!state.is_item_expanded(&Job(1)));
        assert!(!state.is_item_expanded(&Job(2)));
        assert!(!state.collapse_all());
    }
}
