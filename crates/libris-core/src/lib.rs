//! Libris Core - a personal book catalog
//!
//! This crate provides the core of the libris catalog manager:
//!
//! - **Work**: The catalog record and its identity rule
//! - **Import**: One-shot reconciliation of externally shaped records, tagged with provenance
//! - **Store**: The authoritative collection, backed by a JSON file or SQLite
//! - **Catalog**: Create/update/delete and list/get/export over a store
//! - **Config**: Listener, storage, import and search settings
//!
//! # Architecture
//!
//! ```text
//! HTTP handlers → CatalogService → dyn CatalogStore → JsonFileStore | SqliteStore
//!                        ↑
//!                  ImportBatch
//! ```
//!
//! Every store method takes exclusive access for its whole
//! read-modify-write-persist sequence, so concurrent requests never lose
//! updates and a successful mutation is durable when it returns.

pub mod catalog;
pub mod config;
pub mod error;
pub mod import;
pub mod store;
pub mod work;

pub use catalog::{CatalogService, EXPORT_CONTENT_TYPE, EXPORT_FILENAME};
pub use config::{
    CatalogBackend, CatalogConfig, ImportConfig, LibrisConfig, SearchConfig, ServerConfig,
};
pub use error::{CatalogError, ConfigError, Result};
pub use import::{ImportBatch, ImportRequest, ImportSummary, ImportedWork, DEFAULT_IMPORT_SOURCE};
pub use store::{open_store, CatalogStore, JsonFileStore};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use work::{Catalog, Work, WorkFields, WorkId, MANUAL_SOURCE};

/// Returns the version of libris-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
