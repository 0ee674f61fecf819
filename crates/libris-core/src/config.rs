//! Configuration for libris
//!
//! Loaded from a TOML file, then overridden from the environment:
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:8080"
//!
//! [catalog]
//! backend = "json"        # or "sqlite"
//! path = "catalog.json"
//!
//! [import]
//! path = "import.json"
//! on_start = false
//!
//! [search]
//! endpoint = "https://openlibrary.org/search.json"
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::import::ImportRequest;

const DEFAULT_JSON_PATH: &str = "catalog.json";
const DEFAULT_SQLITE_PATH: &str = "works.db";

/// System-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrisConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
    pub search: SearchConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Which medium holds the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    Json,
    Sqlite,
}

impl std::str::FromStr for CatalogBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::OutOfRange(format!(
                "unknown catalog backend '{}'",
                other
            ))),
        }
    }
}

/// Catalog storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Json,
            path: PathBuf::from(DEFAULT_JSON_PATH),
        }
    }
}

impl CatalogConfig {
    /// The catalog path, with the SQLite default swapped in when the path
    /// was left at the JSON default.
    pub fn resolved_path(&self) -> PathBuf {
        match self.backend {
            CatalogBackend::Sqlite if self.path == Path::new(DEFAULT_JSON_PATH) => {
                PathBuf::from(DEFAULT_SQLITE_PATH)
            }
            _ => self.path.clone(),
        }
    }
}

/// Startup import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub path: PathBuf,
    /// Import at startup; a missing source is then fatal
    pub on_start: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("import.json"),
            on_start: false,
        }
    }
}

impl ImportConfig {
    /// The startup import to run, if one was requested
    pub fn startup_request(&self) -> Option<ImportRequest> {
        self.on_start
            .then(|| ImportRequest::required(self.path.clone()))
    }
}

/// External search relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openlibrary.org/search.json".to_string(),
            timeout_secs: 30,
            user_agent: concat!("libris/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LibrisConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Load from `./libris.toml`, then the user config directory, else defaults.
    pub fn load_standard() -> Result<Self, ConfigError> {
        for candidate in Self::standard_locations() {
            if candidate.is_file() {
                tracing::info!(path = %candidate.display(), "Loading configuration");
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn standard_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from("libris.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("libris").join("config.toml"));
        }
        locations
    }

    /// Apply `LIBRIS_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LIBRIS_ADDR") {
            self.server.addr = addr;
        }
        if let Some(backend) = lookup("LIBRIS_BACKEND") {
            self.catalog.backend = backend.parse()?;
        }
        if let Some(path) = lookup("LIBRIS_CATALOG") {
            self.catalog.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LIBRIS_IMPORT") {
            self.import.path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("LIBRIS_IMPORT_ON_START") {
            self.import.on_start = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(endpoint) = lookup("LIBRIS_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::MissingField("server.addr".to_string()));
        }
        if self.catalog.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("catalog.path".to_string()));
        }
        if self.import.on_start && self.import.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("import.path".to_string()));
        }
        if self.search.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("search.endpoint".to_string()));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "search.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
