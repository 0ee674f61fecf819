//! Shared helpers for catalog integration tests

#![allow(dead_code)]

use std::sync::Arc;

use libris_core::{CatalogService, JsonFileStore, SqliteStore, Work};
use tempfile::TempDir;

/// Which store backs the service under test
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Json,
    Sqlite,
}

/// A service plus the directory keeping its files alive
pub struct Harness {
    pub dir: TempDir,
    pub catalog: CatalogService,
}

pub fn open(backend: Backend) -> Harness {
    let dir = tempfile::tempdir().expect("create temp dir");
    let catalog = match backend {
        Backend::Json => CatalogService::new(Arc::new(JsonFileStore::new(
            dir.path().join("catalog.json"),
        ))),
        Backend::Sqlite => CatalogService::new(Arc::new(
            SqliteStore::open(&dir.path().join("works.db")).expect("open sqlite"),
        )),
    };
    Harness { dir, catalog }
}

/// Every work, ordered by id
pub fn sorted(mut works: Vec<Work>) -> Vec<Work> {
    works.sort_by(|a, b| a.id.cmp(&b.id));
    works
}
