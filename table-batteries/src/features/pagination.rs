//! Pagination feature: page number and page size.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persist::{DecodeError, PersistedState};

/// Default page size.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Pagination feature configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub is_enabled: bool,
    /// Page size applied when nothing is persisted.
    ///
    /// Default: 10
    pub initial_items_per_page: usize,
    /// Page sizes offered by the per-page control.
    pub per_page_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            is_enabled: false,
            initial_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            per_page_options: vec![10, 20, 50, 100],
        }
    }
}

impl PaginationConfig {
    /// An enabled pagination feature with default sizes.
    pub fn enabled() -> Self {
        Self {
            is_enabled: true,
            ..Default::default()
        }
    }

    /// Set the initial page size.
    pub fn initial_items_per_page(mut self, n: usize) -> Self {
        self.initial_items_per_page = n;
        self
    }

    /// Set the offered page sizes.
    pub fn per_page_options(mut self, options: impl IntoIterator<Item = usize>) -> Self {
        self.per_page_options = options.into_iter().collect();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_items_per_page == 0 || self.per_page_options.contains(&0) {
            return Err(ConfigError::ZeroItemsPerPage);
        }
        Ok(())
    }
}

/// Current page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    page_number: usize,
    items_per_page: usize,
}

impl PaginationState {
    /// Initial state for a config.
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            page_number: 1,
            items_per_page: config.initial_items_per_page.max(1),
        }
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page_number - 1) * self.items_per_page
    }

    /// Number of pages needed for `total_item_count` items; zero for an empty set.
    pub fn total_pages(&self, total_item_count: usize) -> usize {
        total_item_count.div_ceil(self.items_per_page)
    }

    /// The highest page number that is valid for `total_item_count`.
    pub fn last_page(&self, total_item_count: usize) -> usize {
        self.total_pages(total_item_count).max(1)
    }

    /// Go to a page. Values below 1 clamp to 1. Returns true if it changed.
    pub fn set_page_number(&mut self, n: usize) -> bool {
        let n = n.max(1);
        let changed = self.page_number != n;
        self.page_number = n;
        changed
    }

    /// Change the page size and return to page 1. Returns true if anything changed.
    pub fn set_items_per_page(&mut self, n: usize) -> Result<bool, ConfigError> {
        if n == 0 {
            return Err(ConfigError::ZeroItemsPerPage);
        }
        let changed = self.items_per_page != n || self.page_number != 1;
        self.items_per_page = n;
        self.page_number = 1;
        Ok(changed)
    }

    /// Clamp the page number into `[1, last_page]`. Returns true if it moved.
    pub fn clamp_to(&mut self, total_item_count: usize) -> bool {
        let last = self.last_page(total_item_count);
        if self.page_number > last {
            self.page_number = last;
            true
        } else {
            false
        }
    }
}

impl PersistedState for PaginationState {
    const STORAGE_KEY: &'static str = "pagination";
    const URL_PARAMS: &'static [&'static str] = &["pageNumber", "itemsPerPage"];

    fn to_url_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("pageNumber", Some(self.page_number.to_string())),
            ("itemsPerPage", Some(self.items_per_page.to_string())),
        ]
    }

    fn from_url_params(
        get: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, DecodeError> {
        let (page, per_page) = match (get("pageNumber"), get("itemsPerPage")) {
            (None, None) => return Ok(None),
            (Some(page), Some(per_page)) => (page, per_page),
            _ => {
                return Err(DecodeError(
                    "pageNumber and itemsPerPage must be set together".into(),
                ));
            }
        };
        let parse = |name: &str, raw: &str| -> Result<usize, DecodeError> {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(DecodeError(format!("invalid {name} '{raw}'"))),
            }
        };
        Ok(Some(Self {
            page_number: parse("pageNumber", &page)?,
            items_per_page: parse("itemsPerPage", &per_page)?,
        }))
    }
}

impl PaginationState {
    /// Whether a deserialized state satisfies the invariants.
    pub(crate) fn is_valid(&self) -> bool {
        self.page_number >= 1 && self.items_per_page >= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(page: usize, per_page: usize) -> PaginationState {
        PaginationState {
            page_number: page,
            items_per_page: per_page,
        }
    }

    #[test]
    fn test_total_pages() {
        let s = state(1, 10);
        assert_eq!(s.total_pages(0), 0);
        assert_eq!(s.total_pages(10), 1);
        assert_eq!(s.total_pages(11), 2);
        assert_eq!(s.last_page(0), 1);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut s = state(3, 10);
        assert!(s.clamp_to(12));
        assert_eq!(s.page_number(), 2);
        assert!(!s.clamp_to(12));

        let mut empty = state(4, 10);
        empty.clamp_to(0);
        assert_eq!(empty.page_number(), 1);
    }

    #[test]
    fn test_set_items_per_page_resets_page() {
        let mut s = state(5, 10);
        assert!(s.set_items_per_page(20).unwrap());
        assert_eq!(s.page_number(), 1);
        assert_eq!(s.items_per_page(), 20);
        assert_eq!(s.set_items_per_page(0), Err(ConfigError::ZeroItemsPerPage));
    }

    #[test]
    fn test_page_number_floor() {
        let mut s = state(2, 10);
        s.set_page_number(0);
        assert_eq!(s.page_number(), 1);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_url_params_reject_garbage() {
        let get = |name: &str| match name {
            "pageNumber" => Some("two".to_string()),
            _ => Some("10".to_string()),
        };
        assert!(PaginationState::from_url_params(&get).is_err());

        let zero = |name: &str| match name {
            "pageNumber" => Some("1".to_string()),
            _ => Some("0".to_string()),
        };
        assert!(PaginationState::from_url_params(&zero).is_err());
    }
}
