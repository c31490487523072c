//! Error types

use thiserror::Error;

/// Delimiter between the persistence prefix and a parameter or feature name.
pub const KEY_DELIMITER: char = ':';

/// A programming mistake in the way a table is configured or driven.
///
/// These are returned at construction time, or from setters that receive a
/// key the table never declared. They are never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A filter value was set for a category that was not declared.
    #[error("unknown filter category '{0}'")]
    UnknownFilterCategory(String),

    /// Two filter categories share the same key.
    #[error("filter category '{0}' is declared more than once")]
    DuplicateFilterCategory(String),

    /// A sort column is not in the sortable-columns allow-list.
    #[error("column '{0}' is not sortable")]
    UnknownSortColumn(String),

    /// A column key does not match any declared column.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Two columns share the same key.
    #[error("column '{0}' is declared more than once")]
    DuplicateColumn(String),

    /// The persistence key prefix is empty or contains the reserved delimiter.
    #[error("invalid persistence key prefix '{prefix}': must be non-empty and must not contain '{KEY_DELIMITER}'")]
    InvalidPersistencePrefix {
        /// The rejected prefix.
        prefix: String,
    },

    /// Page size must be greater than zero.
    #[error("items per page must be greater than zero")]
    ZeroItemsPerPage,

    /// An operation of one expansion mode was used on a table configured for the other.
    #[error("expansion operation requires {expected} mode")]
    ExpansionMode {
        /// The mode the operation needs.
        expected: &'static str,
    },

    /// An operation was invoked on a feature that is not enabled.
    #[error("feature '{0}' is not enabled for this table")]
    FeatureDisabled(&'static str),
}

/// Errors from opening or flushing a file-backed storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available on this platform")]
    NoDataDir,
}
