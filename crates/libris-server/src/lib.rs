//! Libris Server - Catalog API Server
//!
//! HTTP surface for the libris catalog plus the external search relay.

pub mod error;
pub mod http;
pub mod relay;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use libris_core::{open_store, CatalogService, ImportConfig, ImportSummary, LibrisConfig};

pub use error::ApiError;
pub use relay::{RelayError, SearchRelay};

/// Shared application state
pub struct AppState {
    pub catalog: CatalogService,
    pub relay: SearchRelay,
}

impl AppState {
    pub fn new(catalog: CatalogService, relay: SearchRelay) -> Self {
        Self { catalog, relay }
    }

    /// Open the configured store and build the relay
    pub fn from_config(config: &LibrisConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = open_store(&config.catalog)?;
        let relay = SearchRelay::new(&config.search)?;
        Ok(Self::new(CatalogService::new(store), relay))
    }
}

/// Run the startup import if one was requested.
///
/// A requested import whose source is missing or unreadable is an error
/// the caller should treat as fatal.
pub fn run_startup_import(
    catalog: &CatalogService,
    config: &ImportConfig,
) -> libris_core::Result<Option<ImportSummary>> {
    let Some(request) = config.startup_request() else {
        tracing::debug!("Startup import not requested");
        return Ok(None);
    };
    tracing::info!(path = %request.path.display(), "Importing catalog records");
    catalog.import_from(&request)
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Work endpoints
        .route("/", get(http::list_works))
        .route("/works", get(http::list_works).post(http::create_work))
        .route(
            "/works/{id}",
            get(http::get_work)
                .put(http::update_work)
                .delete(http::delete_work),
        )
        // Form endpoints
        .route("/work/{id}", get(http::get_work))
        .route("/work/create", post(http::create_work_form))
        .route("/work/update/{id}", post(http::update_work_form))
        .route("/work/delete/{id}", post(http::delete_work_form))
        // Export and search
        .route("/export", get(http::export_catalog))
        .route("/search", get(http::search).post(http::search_form))
        // System endpoints
        .route("/status", get(http::get_status))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Libris server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
