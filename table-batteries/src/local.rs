//! Client-side filtering, sorting and pagination.
//!
//! For tables that hold their whole data set in memory. The results feed
//! [`TableState::derive`] exactly like a server page would.

use std::cmp::Ordering;

use crate::features::{
    ActiveSort, FilterCategory, FilterKind, FilterValues, PaginationState, SortDirection,
};
use crate::item::{SortValue, TableItem};
use crate::state::TableState;

/// Keep the items matching every active filter category.
///
/// `search` categories match a case-insensitive substring of any of the
/// item's values; `select` categories match when any item value equals any
/// selected value. Values for undeclared categories are ignored.
pub fn filter_items<'a, T: TableItem>(
    items: impl IntoIterator<Item = &'a T>,
    categories: &[FilterCategory],
    values: &FilterValues,
) -> Vec<&'a T> {
    let active: Vec<(&FilterCategory, Vec<String>)> = categories
        .iter()
        .filter_map(|category| {
            let selected = values.get(&category.key).filter(|v| !v.is_empty())?;
            let selected = match category.kind {
                FilterKind::Search => selected.iter().map(|v| v.to_lowercase()).collect(),
                FilterKind::Select => selected.clone(),
            };
            Some((category, selected))
        })
        .collect();

    items
        .into_iter()
        .filter(|item| {
            active
                .iter()
                .all(|(category, selected)| matches_category(*item, category, selected))
        })
        .collect()
}

fn matches_category<T: TableItem>(
    item: &T,
    category: &FilterCategory,
    selected: &[String],
) -> bool {
    let item_values = item.filter_values(&category.key);
    match category.kind {
        FilterKind::Search => item_values.iter().any(|value| {
            let value = value.to_lowercase();
            selected.iter().any(|needle| value.contains(needle.as_str()))
        }),
        FilterKind::Select => item_values.iter().any(|value| selected.contains(value)),
    }
}

/// Stable sort by the active column; items without a value sort last.
pub fn sort_items<T: TableItem>(items: &mut [&T], active_sort: Option<&ActiveSort>) {
    let Some(sort) = active_sort else {
        return;
    };
    items.sort_by_cached_key(|item| SortKey(item.sort_value(&sort.column_key), sort.direction));
}

struct SortKey(Option<SortValue>, SortDirection);

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => match self.1 {
                SortDirection::Asc => a.compare(b),
                SortDirection::Desc => b.compare(a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// The slice of `items` on the current page.
pub fn paginate_items<'s, T>(items: &'s [T], pagination: &PaginationState) -> &'s [T] {
    let start = pagination.offset().min(items.len());
    let end = start
        .saturating_add(pagination.items_per_page())
        .min(items.len());
    &items[start..end]
}

/// The current page of an in-memory data set.
#[derive(Debug)]
pub struct LocalTable<'a, T> {
    /// Items of the current page, filtered and sorted.
    pub page: Vec<&'a T>,
    /// Number of items left after filtering; the `total_item_count` to derive with.
    pub total_item_count: usize,
}

impl<'a, T: TableItem> LocalTable<'a, T> {
    /// Filter, sort and paginate `items` with the table's enabled features.
    pub fn derive(items: &'a [T], state: &TableState<T::Key>) -> Self {
        let config = state.config();
        let mut filtered = if config.filter.is_enabled {
            filter_items(items, &config.filter.categories, state.filter().values())
        } else {
            items.iter().collect()
        };

        if config.sort.is_enabled {
            sort_items(&mut filtered, state.sort().active_sort());
        }

        let total_item_count = filtered.len();
        let page = if config.pagination.is_enabled {
            let mut pagination = *state.pagination();
            pagination.clamp_to(total_item_count);
            paginate_items(&filtered, &pagination).to_vec()
        } else {
            filtered
        };

        log::trace!(
            "Local table '{}': {} of {} items, {} on page",
            config.table_name,
            total_item_count,
            items.len(),
            page.len()
        );

        Self {
            page,
            total_item_count,
        }
    }

    /// Owned copies of the page, for passing to [`TableState::derive`].
    pub fn cloned(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.page.iter().map(|item| (*item).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Column, TableConfig};
    use crate::features::{FilterConfig, PaginationConfig, SelectOption, SortConfig};

    #[derive(Debug, Clone, PartialEq)]
    struct Credential {
        id: u32,
        name: &'static str,
        cred_type: &'static str,
        uses: Option<i64>,
    }

    impl TableItem for Credential {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn sort_value(&self, column_key: &str) -> Option<SortValue> {
            match column_key {
                "name" => Some(SortValue::text(self.name)),
                "uses" => self.uses.map(SortValue::from),
                _ => None,
            }
        }

        fn filter_values(&self, category_key: &str) -> Vec<String> {
            match category_key {
                "search_by_name" => vec![self.name.to_string()],
                "cred_type" => vec![self.cred_type.to_string()],
                _ => Vec::new(),
            }
        }
    }

    fn credentials() -> Vec<Credential> {
        vec![
            Credential { id: 1, name: "Lab SSH", cred_type: "network", uses: Some(4) },
            Credential { id: 2, name: "vcenter-admin", cred_type: "vcenter", uses: None },
            Credential { id: 3, name: "lab-sat", cred_type: "satellite", uses: Some(1) },
            Credential { id: 4, name: "prod ssh", cred_type: "network", uses: Some(9) },
        ]
    }

    fn categories() -> Vec<FilterCategory> {
        vec![
            FilterCategory::search("search_by_name", "Name"),
            FilterCategory::select(
                "cred_type",
                "Type",
                [
                    SelectOption::new("network", "Network"),
                    SelectOption::new("vcenter", "vCenter"),
                ],
            ),
        ]
    }

    fn ids(items: &[&Credential]) -> Vec<u32> {
        items.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = credentials();
        let mut values = FilterValues::new();
        values.insert("search_by_name".into(), vec!["LAB".into()]);
        assert_eq!(ids(&filter_items(&items, &categories(), &values)), vec![1, 3]);
    }

    #[test]
    fn test_categories_are_anded() {
        let items = credentials();
        let mut values = FilterValues::new();
        values.insert("search_by_name".into(), vec!["ssh".into()]);
        values.insert("cred_type".into(), vec!["network".into(), "vcenter".into()]);
        assert_eq!(ids(&filter_items(&items, &categories(), &values)), vec![1, 4]);

        values.insert("cred_type".into(), vec!["vcenter".into()]);
        assert!(filter_items(&items, &categories(), &values).is_empty());
    }

    #[test]
    fn test_sort_puts_missing_values_last() {
        let items = credentials();
        let mut refs: Vec<&Credential> = items.iter().collect();

        sort_items(&mut refs, Some(&ActiveSort::asc("uses")));
        assert_eq!(ids(&refs), vec![3, 1, 4, 2]);

        sort_items(&mut refs, Some(&ActiveSort::desc("uses")));
        assert_eq!(ids(&refs), vec![4, 1, 3, 2]);

        sort_items(&mut refs, Some(&ActiveSort::asc("name")));
        assert_eq!(ids(&refs), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_paginate_past_the_end() {
        let items = credentials();
        let mut pagination = PaginationState::new(&PaginationConfig::enabled());
        pagination.set_items_per_page(3).unwrap();
        pagination.set_page_number(2);
        assert_eq!(paginate_items(&items, &pagination).len(), 1);
        pagination.set_page_number(5);
        assert!(paginate_items(&items, &pagination).is_empty());
    }

    #[test]
    fn test_local_table_derive() {
        let config = TableConfig::new("credentials")
            .columns([Column::new("name", "Name"), Column::new("uses", "Uses")])
            .filter(FilterConfig::enabled(categories()))
            .sort(SortConfig::enabled(["name", "uses"]).initial_sort(ActiveSort::desc("uses")))
            .pagination(PaginationConfig::enabled().initial_items_per_page(2));
        let mut table = TableState::new(config).unwrap();
        table
            .set_filter_value("cred_type", vec!["network".into(), "satellite".into()])
            .unwrap();

        let items = credentials();
        let local = LocalTable::derive(&items, &table);
        assert_eq!(local.total_item_count, 3);
        assert_eq!(ids(&local.page), vec![4, 1]);

        table.set_page_number(2).unwrap();
        let local = LocalTable::derive(&items, &table);
        assert_eq!(ids(&local.page), vec![3]);

        let page = local.cloned();
        let props = table.derive(&page, local.total_item_count, false);
        assert_eq!(props.toolbar().pagination.unwrap().last_page, 2);
    }
}
