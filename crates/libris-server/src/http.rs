//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use libris_core::{Work, WorkFields, WorkId, EXPORT_CONTENT_TYPE, EXPORT_FILENAME};

use crate::error::ApiError;
use crate::AppState;

/// Response for listing works
#[derive(Debug, Serialize)]
pub struct WorksResponse {
    pub works: Vec<Work>,
    pub count: usize,
}

/// List all works, ordered by title
pub async fn list_works(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorksResponse>, ApiError> {
    let mut works = state.catalog.list()?;
    works.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    let count = works.len();
    Ok(Json(WorksResponse { works, count }))
}

/// Get a specific work
pub async fn get_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Work>, ApiError> {
    Ok(Json(state.catalog.get(&WorkId::from(id))?))
}

/// Create a work from a JSON body
pub async fn create_work(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<WorkFields>,
) -> Result<(StatusCode, Json<Work>), ApiError> {
    let work = state.catalog.create(fields)?;
    Ok((StatusCode::CREATED, Json(work)))
}

/// Replace the editable fields of a work
pub async fn update_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(fields): Json<WorkFields>,
) -> Result<Json<Work>, ApiError> {
    Ok(Json(state.catalog.update(&WorkId::from(id), fields)?))
}

/// Delete a work
pub async fn delete_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&WorkId::from(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Form Endpoints
// ============================================================================

/// Create a work from a submitted form, then back to the listing
pub async fn create_work_form(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<WorkFields>,
) -> Result<Redirect, ApiError> {
    state.catalog.create(fields)?;
    Ok(Redirect::to("/"))
}

pub async fn update_work_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(fields): Form<WorkFields>,
) -> Result<Redirect, ApiError> {
    state.catalog.update(&WorkId::from(id), fields)?;
    Ok(Redirect::to("/"))
}

pub async fn delete_work_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    state.catalog.delete(&WorkId::from(id))?;
    Ok(Redirect::to("/"))
}

// ============================================================================
// Export and Search
// ============================================================================

/// Download the whole catalog as JSON
pub async fn export_catalog(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let body = state.catalog.export_snapshot()?;
    let disposition = format!("attachment; filename={}", EXPORT_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Relay a free-text search and stream the upstream body back unchanged
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    relay_search(&state, &params.query).await
}

/// Same relay, with the query taken from a submitted form
pub async fn search_form(
    State(state): State<Arc<AppState>>,
    Form(params): Form<SearchQuery>,
) -> Result<Response, ApiError> {
    relay_search(&state, &params.query).await
}

async fn relay_search(state: &AppState, query: &str) -> Result<Response, ApiError> {
    let upstream = state.relay.search(query).await?;

    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((
        status,
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

/// Get system status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let works = state.catalog.list()?;
    let imported = works.iter().filter(|w| w.from_import).count();

    Ok(Json(serde_json::json!({
        "version": libris_core::version(),
        "backend": state.catalog.backend(),
        "works": {
            "total": works.len(),
            "imported": imported
        },
        "search_endpoint": state.relay.endpoint().as_str()
    })))
}
