//! Error types for libris-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Unknown work id on get/update/delete
    #[error("Work not found: {0}")]
    NotFound(String),

    /// A work with this id is already in the catalog
    #[error("Work already exists: {0}")]
    AlreadyExists(String),

    /// A required field was missing or blank
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The backing medium could not be read or written
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The import batch could not be read or parsed
    #[error("Import source unreadable: {0}")]
    ImportSourceUnreadable(String),

    /// Import was required but the source does not exist
    #[error("Import source missing: {}", .0.display())]
    ImportSourceMissing(PathBuf),
}

impl CatalogError {
    /// Whether the caller can recover by correcting its input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::NotFound(_) | CatalogError::ValidationFailed(_)
        )
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::StoreUnavailable(format!("database: {}", err))
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::StoreUnavailable(format!("io: {}", err))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::StoreUnavailable(format!("serialization: {}", err))
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Config parse error: {0}")]
    Parse(String),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),
}
