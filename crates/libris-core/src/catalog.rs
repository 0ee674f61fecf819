//! Mutation and query API over a catalog store
//!
//! [`CatalogService`] is the boundary the HTTP layer talks to. It checks
//! required fields and hands everything else to the store, which persists
//! each successful mutation before returning.

use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::import::{ImportBatch, ImportRequest, ImportSummary};
use crate::store::CatalogStore;
use crate::work::{Catalog, Work, WorkFields, WorkId};

/// Filename hint for exported catalogs
pub const EXPORT_FILENAME: &str = "catalog_export.json";

/// Media type of exported catalogs
pub const EXPORT_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn list(&self) -> Result<Vec<Work>> {
        self.store.list_all()
    }

    pub fn get(&self, id: &WorkId) -> Result<Work> {
        self.store
            .get(id)?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Create a hand-entered work with a fresh id
    pub fn create(&self, fields: WorkFields) -> Result<Work> {
        validate(&fields)?;
        let work = self.store.insert(Work::manual(fields))?;
        tracing::info!(id = %work.id, title = %work.title, "Created work");
        Ok(work)
    }

    /// Replace author, title and ISBN of an existing work
    pub fn update(&self, id: &WorkId, fields: WorkFields) -> Result<Work> {
        validate(&fields)?;
        let work = self.store.update(id, fields)?;
        tracing::info!(%id, "Updated work");
        Ok(work)
    }

    pub fn delete(&self, id: &WorkId) -> Result<()> {
        self.store.delete(id)?;
        tracing::info!(%id, "Deleted work");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Catalog> {
        self.store.snapshot()
    }

    /// Serialize the whole catalog as an id-keyed JSON document.
    ///
    /// Output is deterministic for a given catalog state and parses back with
    /// the same deserializer the JSON store loads with.
    pub fn export_snapshot(&self) -> Result<Vec<u8>> {
        let catalog = self.store.snapshot()?;
        Ok(serde_json::to_vec_pretty(&catalog)?)
    }

    /// Merge a batch into the catalog, import winning on id collisions
    pub fn import_batch(&self, batch: ImportBatch) -> Result<ImportSummary> {
        let works = batch.into_works()?;
        let summary = self.store.upsert_batch(works)?;
        tracing::info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            "Imported batch"
        );
        Ok(summary)
    }

    /// Load and merge an import source. `Ok(None)` when an optional source is absent.
    pub fn import_from(&self, request: &ImportRequest) -> Result<Option<ImportSummary>> {
        match request.load()? {
            Some(batch) => self.import_batch(batch).map(Some),
            None => Ok(None),
        }
    }
}

/// Fields are stored exactly as given; only a blank title is refused.
fn validate(fields: &WorkFields) -> Result<()> {
    if fields.title.trim().is_empty() {
        return Err(CatalogError::ValidationFailed(
            "title is required".to_string(),
        ));
    }
    Ok(())
}
