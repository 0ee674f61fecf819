//! Pass-through search against an external bibliographic service
//!
//! The relay never interprets the upstream payload; it only refuses empty
//! queries and separates "upstream failed" from "upstream answered".

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use libris_core::SearchConfig;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing query")]
    EmptyQuery,

    #[error("Invalid search endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Search service unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Relay to the configured search endpoint
#[derive(Clone)]
pub struct SearchRelay {
    client: Client,
    endpoint: Url,
}

impl SearchRelay {
    pub fn new(config: &SearchConfig) -> Result<Self, RelayError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| RelayError::InvalidEndpoint {
            url: config.endpoint.clone(),
            message: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The upstream URL for a query
    pub fn search_url(&self, query: &str) -> Result<Url, RelayError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RelayError::EmptyQuery);
        }
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    /// Forward a query. The successful response is handed back unread so
    /// the caller can stream its body.
    pub async fn search(&self, query: &str) -> Result<reqwest::Response, RelayError> {
        let url = self.search_url(query)?;
        tracing::debug!(%url, "Relaying search");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Search service returned an error");
            return Err(RelayError::UpstreamUnavailable(format!(
                "upstream returned {}",
                status
            )));
        }

        Ok(response)
    }
}
