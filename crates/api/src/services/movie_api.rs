//! Client for the third-party movie catalog API.
//!
//! Responses are passed through as raw JSON; only imports map them onto
//! movies (see `domain::services::catalog_import`).

use reqwest::{Client, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MovieApiConfig;

#[derive(Debug, Error)]
pub enum MovieApiError {
    #[error("Invalid movie API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Movie API request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Movie API returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response from movie API: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct MovieApiClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl MovieApiClient {
    pub fn new(config: &MovieApiConfig) -> Result<Self, MovieApiError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| MovieApiError::InvalidBaseUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout_ms: config.timeout_ms,
        })
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path
    /// segment, with query parameters.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, MovieApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MovieApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, MovieApiError> {
        let start = Instant::now();
        debug!(url = %url, "Calling movie API");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MovieApiError::Timeout(self.timeout_ms)
            } else {
                MovieApiError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Movie API request failed");
            return Err(MovieApiError::Status(status.as_u16()));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| MovieApiError::InvalidResponse(e.to_string()))?;

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Movie API request completed"
        );
        Ok(body)
    }

    /// Newest movies, one page.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Value, MovieApiError> {
        let url = self.endpoint(
            &["danh-sach-phim"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )?;
        self.get_json(url).await
    }

    /// Full movie payload including episodes.
    pub async fn details(&self, id: &str) -> Result<Value, MovieApiError> {
        let url = self.endpoint(&["phim", id], &[])?;
        self.get_json(url).await
    }

    pub async fn search(&self, keyword: &str, page: u32, limit: u32) -> Result<Value, MovieApiError> {
        let url = self.endpoint(
            &["tim-kiem"],
            &[
                ("keyword", keyword.trim().to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        self.get_json(url).await
    }
}
