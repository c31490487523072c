//! Render descriptors derived from a [`TableState`] and the current page.
//!
//! Nothing here renders. Each descriptor carries the values a view needs
//! plus the [`TableAction`] to dispatch back when the user interacts with it.

use crate::config::{Column, TableConfig};
use crate::features::{ActiveSort, ExpandableVariant, FilterCategory, SortDirection};
use crate::item::{ItemKey, TableItem};
use crate::state::{TableAction, TableState};

impl<K: ItemKey> TableState<K> {
    /// Derive render descriptors for one page of items.
    ///
    /// Once loading has finished the page number is clamped to what
    /// `total_item_count` can fill, and an active item that is no longer
    /// on the page is cleared.
    pub fn derive<'a, T>(
        &'a mut self,
        items: &'a [T],
        total_item_count: usize,
        is_loading: bool,
    ) -> TableProps<'a, T>
    where
        T: TableItem<Key = K>,
    {
        if !is_loading {
            self.sync_total_item_count(total_item_count);
            if self.config().active_item.is_enabled {
                self.drop_missing_active_item(items);
            }
        }
        TableProps {
            state: self,
            items,
            total_item_count,
            is_loading,
        }
    }
}

/// Descriptors for one render of a table.
pub struct TableProps<'a, T: TableItem> {
    state: &'a TableState<T::Key>,
    items: &'a [T],
    total_item_count: usize,
    is_loading: bool,
}

/// A column header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell<'a, K> {
    pub column: &'a Column,
    /// Present when the column is sortable.
    pub sort: Option<SortControl<K>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortControl<K> {
    pub is_active: bool,
    /// Direction of the active sort on this column.
    pub direction: Option<SortDirection>,
    /// Dispatched on click: flips an active column, otherwise sorts ascending.
    pub on_sort: TableAction<K>,
}

/// One row of the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowProps<'a, T: TableItem> {
    pub item: &'a T,
    pub key: T::Key,
    /// Position on the current page.
    pub index: usize,
    pub selection: Option<RowSelection<T::Key>>,
    /// Single-mode toggle; `None` in compound mode.
    pub expand: Option<RowExpand<T::Key>>,
    pub active: Option<RowActive<T::Key>>,
    /// Whether a full-width expanded section follows this row.
    pub is_expanded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSelection<K> {
    pub is_selected: bool,
    pub is_selectable: bool,
    /// `None` when the item is not selectable.
    pub on_toggle: Option<TableAction<K>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowExpand<K> {
    pub is_expanded: bool,
    pub on_toggle: TableAction<K>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowActive<K> {
    pub is_active: bool,
    /// Opens this item, or closes it if it is already active.
    pub on_click: TableAction<K>,
}

/// One data cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellProps<'a, K> {
    pub column_key: &'a str,
    /// Accessible label; the column header text.
    pub data_label: &'a str,
    /// Compound-mode toggle for this cell.
    pub expand: Option<CellExpand<K>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellExpand<K> {
    pub is_expanded: bool,
    pub on_toggle: TableAction<K>,
}

/// Controls above or below the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar<'a, K> {
    pub filters: Option<FilterToolbar<'a, K>>,
    pub pagination: Option<PaginationControls>,
    pub bulk_select: Option<BulkSelect<K>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterToolbar<'a, K> {
    pub controls: Vec<FilterControl<'a, K>>,
    pub is_filter_active: bool,
    pub on_clear_all: TableAction<K>,
}

/// The control of one filter category.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl<'a, K> {
    pub category: &'a FilterCategory,
    pub values: &'a [String],
    pub on_clear: TableAction<K>,
}

impl<K> FilterControl<'_, K> {
    /// The action that replaces this category's values.
    pub fn set(&self, values: Vec<String>) -> TableAction<K> {
        TableAction::SetFilter {
            category_key: self.category.key.clone(),
            values,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Page navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub page_number: usize,
    pub items_per_page: usize,
    pub per_page_options: Vec<usize>,
    pub total_item_count: usize,
    /// Zero for an empty set.
    pub total_pages: usize,
    pub last_page: usize,
}

impl PaginationControls {
    pub fn is_first_page(&self) -> bool {
        self.page_number <= 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page_number >= self.last_page
    }

    /// 1-based inclusive range of the items on this page; `None` when empty.
    pub fn item_range(&self) -> Option<(usize, usize)> {
        let first = (self.page_number - 1) * self.items_per_page + 1;
        if self.total_item_count == 0 || first > self.total_item_count {
            return None;
        }
        let last = (first + self.items_per_page - 1).min(self.total_item_count);
        Some((first, last))
    }

    pub fn first<K>(&self) -> Option<TableAction<K>> {
        (!self.is_first_page()).then_some(TableAction::SetPage(1))
    }

    pub fn previous<K>(&self) -> Option<TableAction<K>> {
        (!self.is_first_page()).then(|| TableAction::SetPage(self.page_number - 1))
    }

    pub fn next<K>(&self) -> Option<TableAction<K>> {
        (!self.is_last_page()).then(|| TableAction::SetPage(self.page_number + 1))
    }

    pub fn last<K>(&self) -> Option<TableAction<K>> {
        (!self.is_last_page()).then_some(TableAction::SetPage(self.last_page))
    }

    /// Jump to a page, clamped into `[1, last_page]`.
    pub fn go_to<K>(&self, page_number: usize) -> TableAction<K> {
        TableAction::SetPage(page_number.clamp(1, self.last_page))
    }

    pub fn set_items_per_page<K>(&self, n: usize) -> TableAction<K> {
        TableAction::SetItemsPerPage(n)
    }
}

/// Bulk selection over the selectable items of the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkSelect<K> {
    /// Selected items across all pages.
    pub selected_count: usize,
    pub page_selectable_count: usize,
    pub are_all_selected: bool,
    /// Some, but not all, of the page is selected.
    pub is_partial: bool,
    pub on_select_page: TableAction<K>,
    pub on_deselect_page: TableAction<K>,
    pub on_select_none: TableAction<K>,
}

impl<'a, T: TableItem> TableProps<'a, T> {
    fn config(&self) -> &'a TableConfig {
        self.state.config()
    }

    /// Items of the current page, as passed to `derive`.
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    pub fn total_item_count(&self) -> usize {
        self.total_item_count
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether the empty-state row should be shown.
    pub fn is_empty(&self) -> bool {
        !self.is_loading && self.items.is_empty()
    }

    /// Width of a full-width row, in columns.
    pub fn num_rendered_columns(&self) -> usize {
        self.config().num_rendered_columns()
    }

    pub fn header_cells(&self) -> Vec<HeaderCell<'a, T::Key>> {
        let config = self.config();
        let state = self.state.sort();
        config
            .columns
            .iter()
            .map(|column| {
                let sort = (config.sort.is_enabled && config.sort.is_sortable(&column.key))
                    .then(|| {
                        let active = state
                            .active_sort()
                            .filter(|active| active.column_key == column.key);
                        SortControl {
                            is_active: active.is_some(),
                            direction: active.map(|active| active.direction),
                            on_sort: TableAction::SetSort(state.next_sort_for(&column.key)),
                        }
                    });
                HeaderCell { column, sort }
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<RowProps<'a, T>> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| self.row(index, item))
            .collect()
    }

    fn row(&self, index: usize, item: &'a T) -> RowProps<'a, T> {
        let config = self.config();
        let key = item.key();

        let selection = config.selection.is_enabled.then(|| {
            let is_selectable = item.is_selectable();
            RowSelection {
                is_selected: self.state.selection().is_selected(&key),
                is_selectable,
                on_toggle: is_selectable.then(|| TableAction::ToggleSelected(key.clone())),
            }
        });

        let expand = (config.expansion.is_enabled
            && config.expansion.variant == ExpandableVariant::Single)
            .then(|| RowExpand {
                is_expanded: self.state.expansion().is_expanded(&key),
                on_toggle: TableAction::ToggleExpanded(key.clone()),
            });

        let active = config.active_item.is_enabled.then(|| {
            let is_active = self.state.active_item().is_active(&key);
            RowActive {
                is_active,
                on_click: TableAction::SetActiveItem((!is_active).then(|| key.clone())),
            }
        });

        RowProps {
            item,
            is_expanded: self.is_row_expanded(item),
            key,
            index,
            selection,
            expand,
            active,
        }
    }

    /// Data cells of one row, in column order.
    pub fn cells(&self, item: &T) -> Vec<CellProps<'a, T::Key>> {
        let config = self.config();
        let compound = config.expansion.is_enabled
            && config.expansion.variant == ExpandableVariant::Compound;
        let key = item.key();
        config
            .columns
            .iter()
            .map(|column| CellProps {
                column_key: &column.key,
                data_label: &column.label,
                expand: compound.then(|| CellExpand {
                    is_expanded: self.state.expansion().is_cell_expanded(&key, &column.key),
                    on_toggle: TableAction::ToggleCellExpanded {
                        item: key.clone(),
                        column_key: column.key.clone(),
                    },
                }),
            })
            .collect()
    }

    /// The expanded column of a row in compound mode.
    pub fn expanded_column(&self, item: &T) -> Option<&'a str> {
        if !self.config().expansion.is_enabled {
            return None;
        }
        self.state.expansion().expanded_column(&item.key())
    }

    pub fn is_row_expanded(&self, item: &T) -> bool {
        self.config().expansion.is_enabled && self.state.expansion().is_expanded(&item.key())
    }

    pub fn toolbar(&self) -> Toolbar<'a, T::Key> {
        Toolbar {
            filters: self.filter_toolbar(),
            pagination: self.pagination_controls(),
            bulk_select: self.bulk_select(),
        }
    }

    fn filter_toolbar(&self) -> Option<FilterToolbar<'a, T::Key>> {
        let config = self.config();
        if !config.filter.is_enabled {
            return None;
        }
        let filter = self.state.filter();
        let controls = config
            .filter
            .categories
            .iter()
            .map(|category| FilterControl {
                category,
                values: filter.get(&category.key),
                on_clear: TableAction::ClearFilter(category.key.clone()),
            })
            .collect();
        Some(FilterToolbar {
            controls,
            is_filter_active: filter.is_filter_active(),
            on_clear_all: TableAction::ClearAllFilters,
        })
    }

    fn pagination_controls(&self) -> Option<PaginationControls> {
        let config = self.config();
        if !config.pagination.is_enabled {
            return None;
        }
        let pagination = self.state.pagination();
        Some(PaginationControls {
            page_number: pagination.page_number(),
            items_per_page: pagination.items_per_page(),
            per_page_options: config.pagination.per_page_options.clone(),
            total_item_count: self.total_item_count,
            total_pages: pagination.total_pages(self.total_item_count),
            last_page: pagination.last_page(self.total_item_count),
        })
    }

    fn bulk_select(&self) -> Option<BulkSelect<T::Key>> {
        if !self.config().selection.is_enabled {
            return None;
        }
        let selection = self.state.selection();
        let page_keys: Vec<T::Key> = self
            .items
            .iter()
            .filter(|item| item.is_selectable())
            .map(T::key)
            .collect();
        let selected_on_page = page_keys
            .iter()
            .filter(|key| selection.is_selected(key))
            .count();
        let are_all_selected = selection.are_all_selected(self.items);
        Some(BulkSelect {
            selected_count: selection.len(),
            page_selectable_count: page_keys.len(),
            are_all_selected,
            is_partial: selected_on_page > 0 && !are_all_selected,
            on_select_page: TableAction::SetSelected {
                keys: page_keys.clone(),
                selected: true,
            },
            on_deselect_page: TableAction::SetSelected {
                keys: page_keys,
                selected: false,
            },
            on_select_none: TableAction::SelectNone,
        })
    }

    /// The active sort, for a caption or sort dropdown.
    pub fn active_sort(&self) -> Option<&'a ActiveSort> {
        self.state.sort().active_sort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{
        ActiveItemConfig, ExpansionConfig, FilterConfig, PaginationConfig, SelectionConfig,
        SortConfig,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Source {
        id: u32,
        name: &'static str,
        locked: bool,
    }

    impl TableItem for Source {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn is_selectable(&self) -> bool {
            !self.locked
        }
    }

    fn sources() -> Vec<Source> {
        vec![
            Source { id: 1, name: "lab", locked: false },
            Source { id: 2, name: "prod", locked: true },
            Source { id: 3, name: "dev", locked: false },
        ]
    }

    fn config() -> TableConfig {
        TableConfig::new("sources")
            .columns([Column::new("name", "Name"), Column::new("type", "Type")])
            .filter(FilterConfig::enabled([FilterCategory::search("search_by_name", "Name")]))
            .sort(SortConfig::enabled(["name"]).initial_sort(ActiveSort::asc("name")))
            .pagination(PaginationConfig::enabled())
            .selection(SelectionConfig::enabled())
            .expansion(ExpansionConfig::single())
            .active_item(ActiveItemConfig::enabled())
    }

    #[test]
    fn test_header_cells() {
        let mut table = TableState::new(config()).unwrap();
        let items = sources();
        let props = table.derive(&items, 3, false);
        let headers = props.header_cells();
        assert_eq!(headers.len(), 2);

        let name = headers[0].sort.as_ref().unwrap();
        assert!(name.is_active);
        assert_eq!(name.direction, Some(SortDirection::Asc));
        assert_eq!(name.on_sort, TableAction::SetSort(ActiveSort::desc("name")));
        assert!(headers[1].sort.is_none());
    }

    #[test]
    fn test_rows_describe_selection_and_expansion() {
        let mut table = TableState::new(config()).unwrap();
        table.apply(TableAction::ToggleSelected(1)).unwrap();
        table.apply(TableAction::ToggleExpanded(3)).unwrap();
        let items = sources();
        let props = table.derive(&items, 3, false);
        let rows = props.rows();

        assert!(rows[0].selection.as_ref().unwrap().is_selected);
        assert_eq!(rows[1].selection.as_ref().unwrap().on_toggle, None);
        assert!(rows[2].is_expanded);
        assert_eq!(
            rows[2].expand.as_ref().unwrap().on_toggle,
            TableAction::ToggleExpanded(3)
        );
        assert_eq!(rows[2].index, 2);
        assert_eq!(rows[2].item.name, "dev");
        assert_eq!(props.num_rendered_columns(), 4);
    }

    #[test]
    fn test_compound_cells() {
        let config = config().expansion(ExpansionConfig::compound());
        let mut table = TableState::new(config).unwrap();
        table.set_cell_expanded(1, "type").unwrap();
        let items = sources();
        let props = table.derive(&items, 3, false);

        let cells = props.cells(&items[0]);
        assert_eq!(cells[0].data_label, "Name");
        assert!(!cells[0].expand.as_ref().unwrap().is_expanded);
        assert!(cells[1].expand.as_ref().unwrap().is_expanded);
        assert_eq!(props.expanded_column(&items[0]), Some("type"));
        assert!(props.rows()[0].expand.is_none());
    }

    #[test]
    fn test_derive_clamps_page_once_loaded() {
        let mut table = TableState::new(config()).unwrap();
        table.set_page_number(3).unwrap();
        let items = sources();

        let props = table.derive(&items, 12, true);
        assert_eq!(props.toolbar().pagination.unwrap().page_number, 3);

        let props = table.derive(&items, 12, false);
        let pagination = props.toolbar().pagination.unwrap();
        assert_eq!(pagination.page_number, 2);
        assert_eq!(pagination.total_pages, 2);
        assert_eq!(pagination.next::<u32>(), None);
        assert_eq!(pagination.previous::<u32>(), Some(TableAction::SetPage(1)));
        assert_eq!(pagination.item_range(), Some((11, 12)));
    }

    #[test]
    fn test_derive_drops_missing_active_item() {
        let mut table = TableState::new(config()).unwrap();
        table.set_active_item(Some(9)).unwrap();
        let items = sources();

        table.derive(&items, 3, true);
        assert!(table.active_item().is_active(&9));

        let props = table.derive(&items, 3, false);
        assert!(props.rows().iter().all(|row| !row.active.as_ref().unwrap().is_active));
        assert_eq!(table.active_item().active_item(), None);
    }

    #[test]
    fn test_bulk_select_is_page_scoped() {
        let mut table = TableState::new(config()).unwrap();
        table.apply(TableAction::ToggleSelected(1)).unwrap();
        let items = sources();
        let props = table.derive(&items, 3, false);
        let bulk = props.toolbar().bulk_select.unwrap();

        assert_eq!(bulk.page_selectable_count, 2);
        assert!(bulk.is_partial);
        assert!(!bulk.are_all_selected);
        assert_eq!(
            bulk.on_select_page,
            TableAction::SetSelected {
                keys: vec![1, 3],
                selected: true
            }
        );
    }

    #[test]
    fn test_filter_toolbar_and_empty_state() {
        let mut table = TableState::new(config()).unwrap();
        table
            .set_filter_value("search_by_name", vec!["zzz".into()])
            .unwrap();
        let items: Vec<Source> = Vec::new();
        let props = table.derive(&items, 0, false);
        let filters = props.toolbar().filters.unwrap();

        assert!(filters.is_filter_active);
        assert!(filters.controls[0].is_active());
        assert_eq!(
            filters.controls[0].set(vec![]),
            TableAction::SetFilter {
                category_key: "search_by_name".into(),
                values: vec![]
            }
        );
        assert!(props.is_empty());
    }
}
