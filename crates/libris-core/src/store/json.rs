//! Flat-file JSON catalog

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{not_found, CatalogStore};
use crate::error::{CatalogError, Result};
use crate::import::ImportSummary;
use crate::work::{Catalog, Work, WorkFields, WorkId};

/// Catalog held as one JSON document mapping id to work.
///
/// The document is read in full and written in full on every operation.
/// Reads also take the lock so they never race the replace of a write.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| CatalogError::StoreUnavailable(format!("lock poisoned: {}", e)))
    }

    /// Load the catalog. An absent file is an empty catalog; an unreadable
    /// or corrupt one is an error.
    fn load(&self) -> Result<Catalog> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Catalog::new()),
            Err(e) => {
                return Err(CatalogError::StoreUnavailable(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        // An empty file is what a crashed first write leaves behind
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Catalog::new());
        }

        let catalog: Catalog = serde_json::from_slice(&data).map_err(|e| {
            CatalogError::StoreUnavailable(format!("parse {}: {}", self.path.display(), e))
        })?;

        // Lookups go by key, so a record filed under another id is unreachable
        if let Some((key, work)) = catalog.iter().find(|(key, work)| **key != work.id) {
            return Err(CatalogError::StoreUnavailable(format!(
                "{}: record {} is filed under key {}",
                self.path.display(),
                work.id,
                key
            )));
        }
        Ok(catalog)
    }

    /// Write the whole catalog via a temp file and rename.
    fn save(&self, catalog: &Catalog) -> Result<()> {
        let raw = serde_json::to_vec(catalog)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, raw).map_err(|e| {
            CatalogError::StoreUnavailable(format!("write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            CatalogError::StoreUnavailable(format!("replace {}: {}", self.path.display(), e))
        })?;
        tracing::debug!(path = %self.path.display(), works = catalog.len(), "Saved catalog");
        Ok(())
    }
}

impl CatalogStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn list_all(&self) -> Result<Vec<Work>> {
        let _guard = self.guard()?;
        Ok(self.load()?.into_values().collect())
    }

    fn get(&self, id: &WorkId) -> Result<Option<Work>> {
        let _guard = self.guard()?;
        Ok(self.load()?.remove(id))
    }

    fn insert(&self, work: Work) -> Result<Work> {
        let _guard = self.guard()?;
        let mut catalog = self.load()?;
        if catalog.contains_key(&work.id) {
            return Err(CatalogError::AlreadyExists(work.id.to_string()));
        }
        catalog.insert(work.id.clone(), work.clone());
        self.save(&catalog)?;
        Ok(work)
    }

    fn update(&self, id: &WorkId, fields: WorkFields) -> Result<Work> {
        let _guard = self.guard()?;
        let mut catalog = self.load()?;
        let work = catalog.get_mut(id).ok_or_else(|| not_found(id))?;
        work.apply(fields);
        let updated = work.clone();
        self.save(&catalog)?;
        Ok(updated)
    }

    fn delete(&self, id: &WorkId) -> Result<()> {
        let _guard = self.guard()?;
        let mut catalog = self.load()?;
        if catalog.remove(id).is_none() {
            return Err(not_found(id));
        }
        self.save(&catalog)
    }

    fn upsert_batch(&self, works: Vec<Work>) -> Result<ImportSummary> {
        let _guard = self.guard()?;
        let mut catalog = self.load()?;
        let mut summary = ImportSummary::default();
        for work in works {
            match catalog.insert(work.id.clone(), work) {
                Some(_) => summary.replaced += 1,
                None => summary.inserted += 1,
            }
        }
        self.save(&catalog)?;
        Ok(summary)
    }

    fn snapshot(&self) -> Result<Catalog> {
        let _guard = self.guard()?;
        self.load()
    }
}
