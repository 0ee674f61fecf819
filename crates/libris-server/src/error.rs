//! Mapping of catalog and relay failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use libris_core::CatalogError;

use crate::relay::RelayError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::Catalog(CatalogError::ValidationFailed(_)) => StatusCode::BAD_REQUEST,
            Self::Catalog(
                CatalogError::StoreUnavailable(_)
                | CatalogError::ImportSourceUnreadable(_)
                | CatalogError::ImportSourceMissing(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Relay(RelayError::EmptyQuery) => StatusCode::BAD_REQUEST,
            Self::Relay(RelayError::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
            Self::Relay(RelayError::InvalidEndpoint { .. } | RelayError::Client(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side failures are logged in full; the client gets a generic message
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            match status {
                StatusCode::BAD_GATEWAY => "Search service unavailable".to_string(),
                _ => "Catalog unavailable".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
