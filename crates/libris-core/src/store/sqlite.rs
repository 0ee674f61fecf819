//! SQLite-backed catalog

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{not_found, CatalogStore};
use crate::error::{CatalogError, Result};
use crate::import::ImportSummary;
use crate::work::{Work, WorkFields, WorkId};

const SELECT_WORK: &str = "SELECT id, author, title, isbn, source, from_import FROM works";

/// Catalog held as one row per work.
///
/// Single-row operations are atomic statements; the batch upsert runs in
/// one transaction so a failed import leaves the table untouched.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CatalogError::StoreUnavailable(format!("open: {}", e)))?;
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CatalogError::StoreUnavailable(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS works (
                id TEXT PRIMARY KEY,
                author TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                isbn TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                from_import INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| CatalogError::StoreUnavailable(format!("lock poisoned: {}", e)))
    }

    fn row_to_work(row: &rusqlite::Row<'_>) -> rusqlite::Result<Work> {
        let id: String = row.get(0)?;
        let from_import: i64 = row.get(5)?;
        Ok(Work {
            id: WorkId::from(id),
            author: row.get(1)?,
            title: row.get(2)?,
            isbn: row.get(3)?,
            source: row.get(4)?,
            from_import: from_import == 1,
        })
    }

    fn get_with(conn: &Connection, id: &WorkId) -> Result<Option<Work>> {
        let work = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_WORK),
                params![id.as_str()],
                Self::row_to_work,
            )
            .optional()?;
        Ok(work)
    }
}

impl CatalogStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn list_all(&self) -> Result<Vec<Work>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(SELECT_WORK)?;
        let works = stmt
            .query_map([], Self::row_to_work)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(works)
    }

    fn get(&self, id: &WorkId) -> Result<Option<Work>> {
        let conn = self.conn()?;
        Self::get_with(&conn, id)
    }

    fn insert(&self, work: Work) -> Result<Work> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO works (id, author, title, isbn, source, from_import)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                work.id.as_str(),
                work.author,
                work.title,
                work.isbn,
                work.source,
                work.from_import as i32,
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return CatalogError::AlreadyExists(work.id.to_string());
                }
            }
            CatalogError::from(e)
        })?;
        tracing::debug!(id = %work.id, "Inserted work");
        Ok(work)
    }

    fn update(&self, id: &WorkId, fields: WorkFields) -> Result<Work> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE works SET author = ?1, title = ?2, isbn = ?3 WHERE id = ?4",
            params![fields.author, fields.title, fields.isbn, id.as_str()],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        tracing::debug!(%id, "Updated work");
        Self::get_with(&conn, id)?.ok_or_else(|| not_found(id))
    }

    fn delete(&self, id: &WorkId) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM works WHERE id = ?1", params![id.as_str()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        tracing::debug!(%id, "Deleted work");
        Ok(())
    }

    fn upsert_batch(&self, works: Vec<Work>) -> Result<ImportSummary> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut summary = ImportSummary::default();
        for work in &works {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM works WHERE id = ?1",
                    params![work.id.as_str()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            tx.execute(
                "INSERT OR REPLACE INTO works (id, author, title, isbn, source, from_import)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    work.id.as_str(),
                    work.author,
                    work.title,
                    work.isbn,
                    work.source,
                    work.from_import as i32,
                ],
            )?;
            if exists {
                summary.replaced += 1;
            } else {
                summary.inserted += 1;
            }
        }

        tx.commit()?;
        tracing::debug!(merged = summary.merged(), "Upserted batch");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::MANUAL_SOURCE;

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let work = store
            .insert(Work::manual(WorkFields::new("A", "T", "1")))
            .unwrap();
        let got = store.get(&work.id).unwrap().unwrap();
        assert_eq!(got, work);
        assert_eq!(got.source, MANUAL_SOURCE);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let work = Work::manual(WorkFields::new("A", "T", "1"));
        store.insert(work.clone()).unwrap();
        assert!(matches!(
            store.insert(work),
            Err(CatalogError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_update_nonexistent_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.update(&"missing".into(), WorkFields::new("A", "T", "1"));
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_delete_nonexistent_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.delete(&"missing".into()),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("works.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert(Work::manual(WorkFields::new("A", "T", "1")))
                .unwrap()
                .id
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().title, "T");
    }

    #[test]
    fn test_upsert_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let existing = store
            .insert(Work {
                id: "x1".into(),
                ..Work::manual(WorkFields::new("Old", "Old", "0"))
            })
            .unwrap();

        let batch = vec![
            Work {
                id: existing.id.clone(),
                author: "B".into(),
                title: "T2".into(),
                isbn: "111".into(),
                source: "libsys".into(),
                from_import: true,
            },
            Work {
                id: "x2".into(),
                author: "C".into(),
                title: "T3".into(),
                isbn: "222".into(),
                source: "libsys".into(),
                from_import: true,
            },
        ];
        let summary = store.upsert_batch(batch).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.replaced, 1);

        let replaced = store.get(&existing.id).unwrap().unwrap();
        assert!(replaced.from_import);
        assert_eq!(replaced.source, "libsys");
    }
}
