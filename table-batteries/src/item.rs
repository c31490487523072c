//! The capability interface a table needs from its items.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Bounds required of an item identity.
///
/// Keys are stored in hash sets (selection), hash maps (expansion) and are
/// persisted as JSON (expansion, active item).
pub trait ItemKey: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {}

impl<K> ItemKey for K where K: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {}

/// Trait for items that can be displayed in a table.
///
/// The table never inspects an item beyond these methods.
///
/// # Example
///
/// ```
/// use table_batteries::{SortValue, TableItem};
///
/// struct Credential {
///     id: u64,
///     name: String,
///     cred_type: String,
/// }
///
/// impl TableItem for Credential {
///     type Key = u64;
///
///     fn key(&self) -> u64 {
///         self.id
///     }
///
///     fn sort_value(&self, column_key: &str) -> Option<SortValue> {
///         match column_key {
///             "name" => Some(SortValue::text(&self.name)),
///             "type" => Some(SortValue::text(&self.cred_type)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableItem {
    /// The identity type.
    type Key: ItemKey;

    /// Return a unique key for this item.
    fn key(&self) -> Self::Key;

    /// Whether this item may be selected.
    fn is_selectable(&self) -> bool {
        true
    }

    /// Value used to order this item by the given column, for client-side sorting.
    fn sort_value(&self, _column_key: &str) -> Option<SortValue> {
        None
    }

    /// Values matched against the given filter category, for client-side filtering.
    fn filter_values(&self, _category_key: &str) -> Vec<String> {
        Vec::new()
    }
}

/// A comparable value extracted from an item for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Compared case-insensitively.
    Text(String),
    Number(f64),
    Bool(bool),
}

impl SortValue {
    /// Create a text sort value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a numeric sort value.
    pub fn number(value: impl Into<f64>) -> Self {
        Self::Number(value.into())
    }

    /// Total order across values.
    ///
    /// Mixed variants order as `Bool < Number < Text`.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
