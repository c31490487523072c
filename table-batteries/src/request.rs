//! Query parameters for server-backed list endpoints.

use std::collections::HashMap;

use crate::features::SortDirection;
use crate::item::ItemKey;
use crate::state::TableState;

/// Mapping from table keys to the names a list endpoint expects.
#[derive(Debug, Clone, Default)]
pub struct RequestParamsOptions {
    column_fields: HashMap<String, String>,
    filter_params: HashMap<String, String>,
}

impl RequestParamsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `field` instead of `column_key` in `ordering`.
    pub fn map_column(mut self, column_key: impl Into<String>, field: impl Into<String>) -> Self {
        self.column_fields.insert(column_key.into(), field.into());
        self
    }

    /// Send `param` instead of `category_key` as the filter parameter name.
    pub fn map_filter(mut self, category_key: impl Into<String>, param: impl Into<String>) -> Self {
        self.filter_params.insert(category_key.into(), param.into());
        self
    }

    fn column_field<'a>(&'a self, column_key: &'a str) -> &'a str {
        self.column_fields
            .get(column_key)
            .map(String::as_str)
            .unwrap_or(column_key)
    }

    fn filter_param<'a>(&'a self, category_key: &'a str) -> &'a str {
        self.filter_params
            .get(category_key)
            .map(String::as_str)
            .unwrap_or(category_key)
    }
}

/// Ordered query pairs describing the current page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    /// Build the request for a table's enabled features.
    ///
    /// Pairs come in this order: `page` and `page_size`, `ordering`, then one
    /// pair per active filter category in declaration order.
    pub fn from_state<K: ItemKey>(state: &TableState<K>, options: &RequestParamsOptions) -> Self {
        let config = state.config();
        let mut pairs = Vec::new();

        if config.pagination.is_enabled {
            let pagination = state.pagination();
            pairs.push(("page".to_string(), pagination.page_number().to_string()));
            pairs.push((
                "page_size".to_string(),
                pagination.items_per_page().to_string(),
            ));
        }

        if config.sort.is_enabled {
            if let Some(sort) = state.sort().active_sort() {
                let field = options.column_field(&sort.column_key);
                let ordering = match sort.direction {
                    SortDirection::Asc => field.to_string(),
                    SortDirection::Desc => format!("-{}", field),
                };
                pairs.push(("ordering".to_string(), ordering));
            }
        }

        if config.filter.is_enabled {
            let filter = state.filter();
            for category in &config.filter.categories {
                let values = filter.get(&category.key);
                if values.is_empty() {
                    continue;
                }
                pairs.push((
                    options.filter_param(&category.key).to_string(),
                    values.join(","),
                ));
            }
        }

        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Look up a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Percent-encoded `name=value&...`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
