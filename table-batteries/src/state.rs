//! Table state aggregator.

use serde::Serialize;

use crate::config::TableConfig;
use crate::error::ConfigError;
use crate::features::{
    ActiveItemState, ActiveSort, ExpansionState, FilterState, FilterValues, PaginationState,
    Selection, SortState,
};
use crate::item::{ItemKey, TableItem};
use crate::persist::Persistence;

/// A user intent emitted by a rendered descriptor, fed back through [`TableState::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction<K> {
    SetFilter { category_key: String, values: Vec<String> },
    ClearFilter(String),
    ClearAllFilters,
    SetSort(ActiveSort),
    ClearSort,
    SetPage(usize),
    SetItemsPerPage(usize),
    ToggleSelected(K),
    SetSelected { keys: Vec<K>, selected: bool },
    SelectNone,
    SetExpandedItem(Option<K>),
    ToggleExpanded(K),
    ToggleCellExpanded { item: K, column_key: String },
    CollapseCell(K),
    SetActiveItem(Option<K>),
}

/// The owned view state of one table instance.
///
/// Constructed once per table from its [`TableConfig`]; persisted feature
/// states are read at construction and written through on every change.
/// Filter and sort changes return the table to page 1 in the same call.
///
/// # Example
///
/// ```
/// use table_batteries::{
///     ActiveSort, Column, PaginationConfig, SortConfig, TableConfig, TableState,
/// };
///
/// let config = TableConfig::new("credentials")
///     .columns([Column::new("name", "Name"), Column::new("type", "Type")])
///     .sort(SortConfig::enabled(["name", "type"]).initial_sort(ActiveSort::asc("name")))
///     .pagination(PaginationConfig::enabled());
///
/// let mut table: TableState<u64> = TableState::new(config).unwrap();
/// table.set_page_number(3).unwrap();
/// let before = table.cache_key();
///
/// table.set_active_sort(ActiveSort::desc("type")).unwrap();
/// assert_eq!(table.pagination().page_number(), 1);
/// assert_ne!(table.cache_key(), before);
/// ```
#[derive(Debug)]
pub struct TableState<K: ItemKey> {
    config: TableConfig,
    persistence: Persistence,
    filter: FilterState,
    sort: SortState,
    pagination: PaginationState,
    selection: Selection<K>,
    expansion: ExpansionState<K>,
    active_item: ActiveItemState<K>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheKey<'a> {
    filter: Option<&'a FilterValues>,
    sort: Option<Option<&'a ActiveSort>>,
    pagination: Option<&'a PaginationState>,
}

impl<K: ItemKey> TableState<K> {
    /// Validate the config and load the initial state.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let persistence = Persistence::new(
            config.persist_to.clone(),
            config.persistence_key_prefix.as_deref(),
        )?;

        let filter = if config.filter.is_enabled {
            match persistence.load::<FilterState>() {
                Some(mut state) => {
                    state.retain_declared(&config.filter);
                    state
                }
                None => FilterState::new(&config.filter),
            }
        } else {
            FilterState::default()
        };

        let sort = if config.sort.is_enabled {
            persistence
                .load::<SortState>()
                .filter(|state| {
                    let valid = state.is_valid_for(&config.sort);
                    if !valid {
                        log::warn!("Ignoring persisted sort on a column that is not sortable");
                    }
                    valid
                })
                .unwrap_or_else(|| SortState::new(&config.sort))
        } else {
            SortState::default()
        };

        let pagination = if config.pagination.is_enabled {
            persistence
                .load::<PaginationState>()
                .filter(PaginationState::is_valid)
                .unwrap_or_else(|| PaginationState::new(&config.pagination))
        } else {
            PaginationState::new(&config.pagination)
        };

        let expansion = if config.expansion.is_enabled {
            let mut state = persistence
                .load::<ExpansionState<K>>()
                .map(|state| state.reconcile(config.expansion.variant))
                .unwrap_or_else(|| ExpansionState::new(config.expansion.variant));
            state.retain_columns(|column| config.column_by_key(column).is_some());
            state
        } else {
            ExpansionState::new(config.expansion.variant)
        };

        let active_item = if config.active_item.is_enabled {
            persistence.load::<ActiveItemState<K>>().unwrap_or_default()
        } else {
            ActiveItemState::default()
        };

        log::debug!(
            "Table '{}' initialised (persist to {:?})",
            config.table_name,
            config.persist_to
        );

        Ok(Self {
            selection: Selection::new(config.selection.mode),
            persistence,
            filter,
            sort,
            pagination,
            expansion,
            active_item,
            config,
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn selection(&self) -> &Selection<K> {
        &self.selection
    }

    pub fn expansion(&self) -> &ExpansionState<K> {
        &self.expansion
    }

    pub fn active_item(&self) -> &ActiveItemState<K> {
        &self.active_item
    }

    /// Stable string summarising everything that shapes the server query.
    ///
    /// Filter, sort and pagination only; disabled features contribute `null`.
    /// Compare against the previous value to decide whether to refetch.
    pub fn cache_key(&self) -> String {
        let key = CacheKey {
            filter: self.config.filter.is_enabled.then_some(self.filter.values()),
            sort: self.config.sort.is_enabled.then_some(self.sort.active_sort()),
            pagination: self.config.pagination.is_enabled.then_some(&self.pagination),
        };
        serde_json::to_string(&key).unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Filter
    // ---------------------------------------------------------------------

    /// Replace the values of a filter category and return to page 1.
    pub fn set_filter_value(
        &mut self,
        category_key: &str,
        values: Vec<String>,
    ) -> Result<(), ConfigError> {
        self.require_enabled(self.config.filter.is_enabled, "filter")?;
        if self
            .filter
            .set_filter_value(&self.config.filter, category_key, values)?
        {
            self.filter_changed();
        }
        Ok(())
    }

    /// Clear one filter category and return to page 1.
    pub fn clear_filter(&mut self, category_key: &str) -> Result<(), ConfigError> {
        self.require_enabled(self.config.filter.is_enabled, "filter")?;
        if self.filter.clear_filter(&self.config.filter, category_key)? {
            self.filter_changed();
        }
        Ok(())
    }

    /// Clear every filter and return to page 1.
    pub fn clear_all_filters(&mut self) -> Result<(), ConfigError> {
        self.require_enabled(self.config.filter.is_enabled, "filter")?;
        if self.filter.clear_all_filters() {
            self.filter_changed();
        }
        Ok(())
    }

    fn filter_changed(&mut self) {
        log::debug!(
            "Table '{}' filters -> {:?}",
            self.config.table_name,
            self.filter.values()
        );
        self.persistence.save(&self.filter);
        self.reset_page();
    }

    // ---------------------------------------------------------------------
    // Sort
    // ---------------------------------------------------------------------

    /// Set the active sort and return to page 1.
    pub fn set_active_sort(&mut self, sort: ActiveSort) -> Result<(), ConfigError> {
        self.require_enabled(self.config.sort.is_enabled, "sort")?;
        if self.sort.set_active_sort(&self.config.sort, sort)? {
            self.sort_changed();
        }
        Ok(())
    }

    /// Remove the active sort and return to page 1.
    pub fn clear_active_sort(&mut self) -> Result<(), ConfigError> {
        self.require_enabled(self.config.sort.is_enabled, "sort")?;
        if self.sort.clear_active_sort() {
            self.sort_changed();
        }
        Ok(())
    }

    fn sort_changed(&mut self) {
        log::debug!(
            "Table '{}' sort -> {:?}",
            self.config.table_name,
            self.sort.active_sort()
        );
        self.persistence.save(&self.sort);
        self.reset_page();
    }

    // ---------------------------------------------------------------------
    // Pagination
    // ---------------------------------------------------------------------

    pub fn set_page_number(&mut self, n: usize) -> Result<(), ConfigError> {
        self.require_enabled(self.config.pagination.is_enabled, "pagination")?;
        if self.pagination.set_page_number(n) {
            self.pagination_changed();
        }
        Ok(())
    }

    /// Change the page size; always returns to page 1.
    pub fn set_items_per_page(&mut self, n: usize) -> Result<(), ConfigError> {
        self.require_enabled(self.config.pagination.is_enabled, "pagination")?;
        if self.pagination.set_items_per_page(n)? {
            self.pagination_changed();
        }
        Ok(())
    }

    /// Clamp the page number to what `total_item_count` can fill.
    ///
    /// Called by [`derive`](Self::derive); returns true if the page moved.
    pub fn sync_total_item_count(&mut self, total_item_count: usize) -> bool {
        if !self.config.pagination.is_enabled {
            return false;
        }
        let moved = self.pagination.clamp_to(total_item_count);
        if moved {
            log::debug!(
                "Table '{}' clamped to page {} of {} items",
                self.config.table_name,
                self.pagination.page_number(),
                total_item_count
            );
            self.persistence.save(&self.pagination);
        }
        moved
    }

    fn reset_page(&mut self) {
        if self.config.pagination.is_enabled && self.pagination.set_page_number(1) {
            self.pagination_changed();
        }
    }

    fn pagination_changed(&mut self) {
        log::debug!(
            "Table '{}' page {} x {}",
            self.config.table_name,
            self.pagination.page_number(),
            self.pagination.items_per_page()
        );
        self.persistence.save(&self.pagination);
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Mutable access to the selection. Selection is never persisted.
    pub fn selection_mut(&mut self) -> Result<&mut Selection<K>, ConfigError> {
        self.require_enabled(self.config.selection.is_enabled, "selection")?;
        Ok(&mut self.selection)
    }

    pub fn toggle_item_selected<T>(&mut self, item: &T) -> Result<(), ConfigError>
    where
        T: TableItem<Key = K>,
    {
        self.selection_mut()?.toggle_item_selected(item);
        Ok(())
    }

    pub fn select_multiple<T>(&mut self, items: &[T], selected: bool) -> Result<(), ConfigError>
    where
        T: TableItem<Key = K>,
    {
        self.selection_mut()?.select_multiple(items, selected);
        Ok(())
    }

    pub fn select_all<T>(&mut self, items: &[T]) -> Result<(), ConfigError>
    where
        T: TableItem<Key = K>,
    {
        self.selection_mut()?.select_all(items);
        Ok(())
    }

    pub fn select_none(&mut self) -> Result<(), ConfigError> {
        self.selection_mut()?.clear();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Expansion
    // ---------------------------------------------------------------------

    /// Single mode: expand one row (collapsing the previous) or none.
    pub fn set_expanded_item(&mut self, key: Option<K>) -> Result<(), ConfigError> {
        self.require_enabled(self.config.expansion.is_enabled, "expansion")?;
        if self.expansion.set_expanded_item(key)? {
            self.expansion_changed();
        }
        Ok(())
    }

    /// Single mode: toggle one row.
    pub fn toggle_item_expanded(&mut self, key: K) -> Result<(), ConfigError> {
        self.require_enabled(self.config.expansion.is_enabled, "expansion")?;
        if self.expansion.toggle_expanded(key)? {
            self.expansion_changed();
        }
        Ok(())
    }

    /// Compound mode: toggle one (row, column) cell.
    pub fn set_cell_expanded(&mut self, key: K, column_key: &str) -> Result<(), ConfigError> {
        self.require_enabled(self.config.expansion.is_enabled, "expansion")?;
        self.config.require_column(column_key)?;
        if self.expansion.set_cell_expanded(key, column_key)? {
            self.expansion_changed();
        }
        Ok(())
    }

    /// Compound mode: collapse a row.
    pub fn collapse_cell(&mut self, key: &K) -> Result<(), ConfigError> {
        self.require_enabled(self.config.expansion.is_enabled, "expansion")?;
        if self.expansion.collapse_cell(key)? {
            self.expansion_changed();
        }
        Ok(())
    }

    fn expansion_changed(&mut self) {
        log::debug!(
            "Table '{}' expanded {:?}",
            self.config.table_name,
            self.expansion.cells()
        );
        self.persistence.save(&self.expansion);
    }

    // ---------------------------------------------------------------------
    // Active item
    // ---------------------------------------------------------------------

    pub fn set_active_item(&mut self, key: Option<K>) -> Result<(), ConfigError> {
        self.require_enabled(self.config.active_item.is_enabled, "activeItem")?;
        if self.active_item.set_active_item(key) {
            log::debug!(
                "Table '{}' active item {:?}",
                self.config.table_name,
                self.active_item.active_item()
            );
            self.persistence.save(&self.active_item);
        }
        Ok(())
    }

    /// Clear the active item if it is not among `items`.
    ///
    /// Used after a page finished loading, so a deleted or filtered-out
    /// item does not keep its details open.
    pub fn drop_missing_active_item<T>(&mut self, items: &[T]) -> bool
    where
        T: TableItem<Key = K>,
    {
        let Some(active) = self.active_item.active_item() else {
            return false;
        };
        if items.iter().any(|item| &item.key() == active) {
            return false;
        }
        log::debug!(
            "Table '{}' active item {:?} left the page",
            self.config.table_name,
            active
        );
        self.active_item.set_active_item(None);
        self.persistence.save(&self.active_item);
        true
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    /// Apply an action emitted by a descriptor.
    pub fn apply(&mut self, action: TableAction<K>) -> Result<(), ConfigError> {
        match action {
            TableAction::SetFilter {
                category_key,
                values,
            } => self.set_filter_value(&category_key, values),
            TableAction::ClearFilter(category_key) => self.clear_filter(&category_key),
            TableAction::ClearAllFilters => self.clear_all_filters(),
            TableAction::SetSort(sort) => self.set_active_sort(sort),
            TableAction::ClearSort => self.clear_active_sort(),
            TableAction::SetPage(n) => self.set_page_number(n),
            TableAction::SetItemsPerPage(n) => self.set_items_per_page(n),
            TableAction::ToggleSelected(key) => {
                self.selection_mut()?.toggle(key);
                Ok(())
            }
            TableAction::SetSelected { keys, selected } => {
                self.selection_mut()?.set_many(keys, selected);
                Ok(())
            }
            TableAction::SelectNone => self.select_none(),
            TableAction::SetExpandedItem(key) => self.set_expanded_item(key),
            TableAction::ToggleExpanded(key) => self.toggle_item_expanded(key),
            TableAction::ToggleCellExpanded { item, column_key } => {
                self.set_cell_expanded(item, &column_key)
            }
            TableAction::CollapseCell(key) => self.collapse_cell(&key),
            TableAction::SetActiveItem(key) => self.set_active_item(key),
        }
    }

    /// Forget every persisted feature state of this table.
    pub fn clear_persisted(&self) {
        self.persistence.clear::<FilterState>();
        self.persistence.clear::<SortState>();
        self.persistence.clear::<PaginationState>();
        self.persistence.clear::<ExpansionState<K>>();
        self.persistence.clear::<ActiveItemState<K>>();
    }

    fn require_enabled(&self, enabled: bool, feature: &'static str) -> Result<(), ConfigError> {
        if enabled {
            Ok(())
        } else {
            Err(ConfigError::FeatureDisabled(feature))
        }
    }
}
