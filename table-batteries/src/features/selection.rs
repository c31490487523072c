//! Selection feature: the set of selected item keys.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::item::{ItemKey, TableItem};

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// At most one item (radio-button style).
    Single,
    /// Any number of items (checkbox style).
    #[default]
    Multi,
}

/// Selection feature configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    pub is_enabled: bool,
    pub mode: SelectionMode,
}

impl SelectionConfig {
    /// Enabled multi-selection.
    pub fn enabled() -> Self {
        Self {
            is_enabled: true,
            mode: SelectionMode::Multi,
        }
    }

    /// Enabled single selection.
    pub fn single() -> Self {
        Self {
            is_enabled: true,
            mode: SelectionMode::Single,
        }
    }
}

/// Tracks selected items by their keys.
///
/// Lookups are O(1). Selection is never cleared implicitly: it survives
/// page, filter and sort changes.
#[derive(Debug, Clone)]
pub struct Selection<K: ItemKey> {
    mode: SelectionMode,
    selected: HashSet<K>,
}

impl<K: ItemKey> Default for Selection<K> {
    fn default() -> Self {
        Self::new(SelectionMode::Multi)
    }
}

impl<K: ItemKey> Selection<K> {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    /// Number of selected keys.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get all selected keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// Toggle a key. Returns true if selection changed.
    pub fn toggle(&mut self, key: K) -> bool {
        let selected = !self.selected.contains(&key);
        self.set(key, selected)
    }

    /// Select or deselect one key. Returns true if selection changed.
    ///
    /// In single mode selecting a key deselects every other one.
    pub fn set(&mut self, key: K, selected: bool) -> bool {
        if !selected {
            return self.selected.remove(&key);
        }
        match self.mode {
            SelectionMode::Single => {
                if self.selected.len() == 1 && self.selected.contains(&key) {
                    return false;
                }
                self.selected.clear();
                self.selected.insert(key);
                true
            }
            SelectionMode::Multi => self.selected.insert(key),
        }
    }

    /// Select or deselect several keys. Returns true if selection changed.
    ///
    /// In single mode only the last key is kept when selecting.
    pub fn set_many(&mut self, keys: impl IntoIterator<Item = K>, selected: bool) -> bool {
        let mut changed = false;
        for key in keys {
            changed |= self.set(key, selected);
        }
        changed
    }

    /// Clear all selections. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Toggle an item, ignoring items that are not selectable.
    pub fn toggle_item_selected<T>(&mut self, item: &T) -> bool
    where
        T: TableItem<Key = K>,
    {
        if !item.is_selectable() {
            return false;
        }
        self.toggle(item.key())
    }

    /// Select or deselect every selectable item given.
    pub fn select_multiple<T>(&mut self, items: &[T], selected: bool) -> bool
    where
        T: TableItem<Key = K>,
    {
        self.set_many(
            items
                .iter()
                .filter(|item| item.is_selectable())
                .map(T::key),
            selected,
        )
    }

    /// Select every selectable item given; "all" is whatever the caller passes.
    pub fn select_all<T>(&mut self, items: &[T]) -> bool
    where
        T: TableItem<Key = K>,
    {
        self.select_multiple(items, true)
    }

    /// Whether every selectable item given is selected.
    ///
    /// False when there is nothing selectable.
    pub fn are_all_selected<T>(&self, items: &[T]) -> bool
    where
        T: TableItem<Key = K>,
    {
        let mut selectable = items.iter().filter(|item| item.is_selectable()).peekable();
        selectable.peek().is_some() && selectable.all(|item| self.is_selected(&item.key()))
    }

    pub fn is_item_selected<T>(&self, item: &T) -> bool
    where
        T: TableItem<Key = K>,
    {
        self.is_selected(&item.key())
    }

    pub fn is_item_selectable<T>(&self, item: &T) -> bool
    where
        T: TableItem<Key = K>,
    {
        item.is_selectable()
    }

    /// Selected items among those given, in their order.
    pub fn selected_items<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: TableItem<Key = K>,
    {
        items
            .iter()
            .filter(|item| self.is_selected(&item.key()))
            .collect()
    }
}

impl<K: ItemKey> PartialEq for Selection<K> {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.selected == other.selected
    }
}
