//! Catalog storage backings
//!
//! Every backing implements [`CatalogStore`]. Each mutating call holds
//! exclusive access for its whole read-modify-write-persist sequence and has
//! persisted the change before it returns.

mod json;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

pub use json::JsonFileStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::config::{CatalogBackend, CatalogConfig};
use crate::error::{CatalogError, Result};
use crate::import::ImportSummary;
use crate::work::{Catalog, Work, WorkFields, WorkId};

/// The trait that all catalog backings implement.
pub trait CatalogStore: Send + Sync {
    /// Short name of the backing, for status reporting.
    fn backend(&self) -> &'static str;

    /// Every work in the catalog. Order is not meaningful.
    fn list_all(&self) -> Result<Vec<Work>>;

    /// Get a work by id.
    fn get(&self, id: &WorkId) -> Result<Option<Work>>;

    /// Insert a new work. Fails if the id is already taken.
    fn insert(&self, work: Work) -> Result<Work>;

    /// Overwrite the editable fields of an existing work.
    fn update(&self, id: &WorkId, fields: WorkFields) -> Result<Work>;

    /// Remove a work.
    fn delete(&self, id: &WorkId) -> Result<()>;

    /// Insert or overwrite each work by id, atomically for the whole batch.
    fn upsert_batch(&self, works: Vec<Work>) -> Result<ImportSummary>;

    /// The catalog as an id-ordered map.
    fn snapshot(&self) -> Result<Catalog> {
        Ok(self
            .list_all()?
            .into_iter()
            .map(|w| (w.id.clone(), w))
            .collect())
    }
}

/// Open the backing named by the configuration
pub fn open_store(config: &CatalogConfig) -> Result<Arc<dyn CatalogStore>> {
    let path = config.resolved_path();
    match config.backend {
        CatalogBackend::Json => {
            tracing::info!(path = %path.display(), "Using JSON catalog file");
            Ok(Arc::new(JsonFileStore::new(path)))
        }
        #[cfg(feature = "sqlite")]
        CatalogBackend::Sqlite => {
            tracing::info!(path = %path.display(), "Using SQLite catalog");
            Ok(Arc::new(SqliteStore::open(&path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        CatalogBackend::Sqlite => Err(CatalogError::StoreUnavailable(
            "SQLite support not enabled. Enable the 'sqlite' feature.".to_string(),
        )),
    }
}

pub(crate) fn not_found(id: &WorkId) -> CatalogError {
    CatalogError::NotFound(id.to_string())
}
