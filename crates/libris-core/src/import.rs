//! Import of externally shaped work records
//!
//! The import source is a JSON object mapping an external id to a record
//! whose field names differ from the native [`Work`] shape:
//!
//! ```json
//! {
//!   "x1": {
//!     "books_id": "x1",
//!     "primaryauthor": "B",
//!     "title": "T2",
//!     "originalisbn": "111",
//!     "source": "libsys"
//!   }
//! }
//! ```
//!
//! Parsing is all-or-nothing: a batch that cannot be read or parsed never
//! reaches the store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::work::{Work, WorkId};

/// Provenance tag for imported records that carry no source of their own
pub const DEFAULT_IMPORT_SOURCE: &str = "import";

/// A record in the external import shape.
///
/// Every field may be absent or `null`; both read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedWork {
    #[serde(default)]
    pub books_id: Option<String>,
    #[serde(default)]
    pub primaryauthor: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub originalisbn: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ImportedWork {
    /// Translate into a native work, falling back to `key` when `books_id` is blank
    fn into_work(self, key: &str) -> Work {
        let id = match self.books_id {
            Some(id) if !id.trim().is_empty() => WorkId::from(id),
            _ => {
                tracing::warn!(key, "Imported record has no books_id, using its key");
                WorkId::from(key)
            }
        };

        let source = match self.source {
            Some(s) if !s.trim().is_empty() => s,
            _ => DEFAULT_IMPORT_SOURCE.to_string(),
        };

        Work {
            id,
            author: self.primaryauthor.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            isbn: self.originalisbn.unwrap_or_default(),
            source,
            from_import: true,
        }
    }
}

/// A parsed import source, keyed by external id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    records: BTreeMap<String, ImportedWork>,
}

impl ImportBatch {
    /// Parse a batch from raw JSON
    pub fn parse(data: &[u8]) -> Result<Self> {
        let records: BTreeMap<String, ImportedWork> = serde_json::from_slice(data)
            .map_err(|e| CatalogError::ImportSourceUnreadable(format!("parse: {}", e)))?;
        Ok(Self { records })
    }

    /// Read and parse a batch from a file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CatalogError::ImportSourceMissing(path.to_path_buf()),
            _ => CatalogError::ImportSourceUnreadable(format!("{}: {}", path.display(), e)),
        })?;
        Self::parse(&data)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Translate every record into a native work.
    ///
    /// Records that resolve to the same id collapse to the last one in key
    /// order. A record with neither a `books_id` nor a key rejects the batch.
    pub fn into_works(self) -> Result<Vec<Work>> {
        let mut works: BTreeMap<WorkId, Work> = BTreeMap::new();
        for (key, record) in self.records {
            let work = record.into_work(&key);
            if work.id.is_empty() {
                return Err(CatalogError::ImportSourceUnreadable(
                    "record with empty id".to_string(),
                ));
            }
            if works.contains_key(&work.id) {
                tracing::warn!(id = %work.id, "Duplicate id in import batch, keeping the later record");
            }
            works.insert(work.id.clone(), work);
        }
        Ok(works.into_values().collect())
    }
}

/// Outcome of merging a batch into the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Ids that were new to the catalog
    pub inserted: usize,
    /// Existing entries overwritten by the import
    pub replaced: usize,
}

impl ImportSummary {
    pub fn merged(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Where to import from and whether a missing source is fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub required: bool,
}

impl ImportRequest {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }

    /// Load the batch. `Ok(None)` means an optional source was absent.
    pub fn load(&self) -> Result<Option<ImportBatch>> {
        match ImportBatch::read(&self.path) {
            Ok(batch) => Ok(Some(batch)),
            Err(CatalogError::ImportSourceMissing(path)) if !self.required => {
                tracing::info!(path = %path.display(), "No import source, skipping import");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "x1": {"books_id": "x1", "primaryauthor": "B", "title": "T2", "originalisbn": "111", "source": "libsys"}
    }"#;

    #[test]
    fn test_translate_sample() {
        let works = ImportBatch::parse(SAMPLE.as_bytes())
            .unwrap()
            .into_works()
            .unwrap();
        assert_eq!(works.len(), 1);
        let w = &works[0];
        assert_eq!(w.id.as_str(), "x1");
        assert_eq!(w.author, "B");
        assert_eq!(w.title, "T2");
        assert_eq!(w.isbn, "111");
        assert_eq!(w.source, "libsys");
        assert!(w.from_import);
    }

    #[test]
    fn test_missing_source_defaults() {
        let batch = ImportBatch::parse(br#"{"k": {"books_id": "k", "title": "T"}}"#).unwrap();
        let works = batch.into_works().unwrap();
        assert_eq!(works[0].source, DEFAULT_IMPORT_SOURCE);

        let batch =
            ImportBatch::parse(br#"{"k": {"books_id": "k", "title": "T", "source": "  "}}"#)
                .unwrap();
        assert_eq!(batch.into_works().unwrap()[0].source, DEFAULT_IMPORT_SOURCE);
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let batch = ImportBatch::parse(
            br#"{"x1": {"books_id": "x1", "primaryauthor": null, "title": "T2", "originalisbn": null, "source": null}}"#,
        )
        .unwrap();
        let works = batch.into_works().unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].author, "");
        assert_eq!(works[0].isbn, "");
        assert_eq!(works[0].source, DEFAULT_IMPORT_SOURCE);

        let batch = ImportBatch::parse(br#"{"k2": {"books_id": null, "title": null}}"#).unwrap();
        let works = batch.into_works().unwrap();
        assert_eq!(works[0].id.as_str(), "k2");
        assert_eq!(works[0].title, "");
    }

    #[test]
    fn test_blank_books_id_uses_key() {
        let batch = ImportBatch::parse(br#"{"key-7": {"title": "T"}}"#).unwrap();
        let works = batch.into_works().unwrap();
        assert_eq!(works[0].id.as_str(), "key-7");
    }

    #[test]
    fn test_empty_id_rejects_batch() {
        let batch = ImportBatch::parse(br#"{"": {"title": "T"}}"#).unwrap();
        assert!(matches!(
            batch.into_works(),
            Err(CatalogError::ImportSourceUnreadable(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let batch = ImportBatch::parse(
            br#"{"a": {"books_id": "same", "title": "First"}, "b": {"books_id": "same", "title": "Second"}}"#,
        )
        .unwrap();
        let works = batch.into_works().unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].title, "Second");
    }

    #[test]
    fn test_malformed_is_unreadable() {
        assert!(matches!(
            ImportBatch::parse(b"{not json"),
            Err(CatalogError::ImportSourceUnreadable(_))
        ));
        assert!(matches!(
            ImportBatch::parse(b"[1, 2]"),
            Err(CatalogError::ImportSourceUnreadable(_))
        ));
    }

    #[test]
    fn test_request_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");

        assert_eq!(ImportRequest::optional(&path).load().unwrap(), None);
        assert!(matches!(
            ImportRequest::required(&path).load(),
            Err(CatalogError::ImportSourceMissing(_))
        ));
    }

    #[test]
    fn test_request_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let batch = ImportRequest::required(&path).load().unwrap().unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_summary_merged() {
        let summary = ImportSummary {
            inserted: 2,
            replaced: 3,
        };
        assert_eq!(summary.merged(), 5);
    }
}
