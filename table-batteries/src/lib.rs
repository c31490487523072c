//! Headless state controller for data tables.
//!
//! A table is declared once with a [`TableConfig`] and owns a
//! [`TableState`]: filter values, active sort, pagination, selection,
//! expanded rows and the active item. Filter, sort, pagination, expansion
//! and the active item can persist to URL query parameters or to a
//! key/value store under a per-table prefix.
//!
//! Each render, [`TableState::derive`] turns the state plus the current page
//! into [`TableProps`]: header, row, cell and toolbar descriptors that carry
//! the [`TableAction`] to dispatch back. For a server-backed table,
//! [`TableState::cache_key`] changes exactly when the page must be
//! refetched and [`RequestParams`] builds the query; in-memory tables use
//! [`LocalTable`] instead.

pub mod config;
pub mod error;
pub mod features;
pub mod item;
pub mod local;
pub mod persist;
pub mod props;
pub mod request;
mod state;

pub use config::{Column, TableConfig};
pub use error::{ConfigError, StorageError};
pub use features::*;
pub use item::{ItemKey, SortValue, TableItem};
pub use local::LocalTable;
pub use persist::{
    HistoryMode, JsonFileStorage, MemoryStorage, PersistTarget, StorageBackend, UrlParams,
};
pub use props::TableProps;
pub use request::{RequestParams, RequestParamsOptions};
pub use state::{TableAction, TableState};
