//! Libris Server Binary
//!
//! Usage: `libris-server [config.toml]`

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use libris_core::LibrisConfig;
use libris_server::{run_startup_import, serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => LibrisConfig::load(&path)?,
        None => LibrisConfig::load_standard()?,
    };
    config.apply_env()?;
    config.validate()?;

    let state = AppState::from_config(&config)?;

    if let Some(summary) = run_startup_import(&state.catalog, &config.import)? {
        tracing::info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            "Startup import complete"
        );
    }

    serve(&config.server.addr, Arc::new(state)).await
}
