//! Google Drive v3 client for browsing and importing video files.
//!
//! Authenticates with a stored OAuth refresh token. The token comes from
//! configuration or is handed over at runtime through `/drive/auth`; the
//! short-lived access token derived from it is cached until shortly before
//! it expires.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use domain::models::movie_source::{DriveFile, DriveFileList};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::GoogleConfig;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

const VIDEO_QUERY: &str = "mimeType contains 'video/' and trashed = false";
const FILE_FIELDS: &str = "id, name, mimeType, description, thumbnailLink, webViewLink";

/// Access tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when Google omits or garbles `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Google Drive is not configured")]
    NotConfigured,

    #[error("Drive file not found")]
    FileNotFound,

    #[error("Invalid Drive URL: {0}")]
    InvalidUrl(String),

    #[error("Google rejected the Drive credentials: {0}")]
    Unauthorized(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Drive API returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response from Drive API: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Expiry instant for a token issued at `now`.
fn token_expiry(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    let fallback = now + ChronoDuration::seconds(DEFAULT_TOKEN_LIFETIME_SECS);
    expires_in
        .filter(|secs| *secs > 0)
        .and_then(ChronoDuration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(fallback)
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

pub struct DriveClient {
    client: Client,
    files_url: Url,
    client_id: String,
    client_secret: String,
    refresh_token: RwLock<Option<String>>,
    access_token: RwLock<Option<CachedToken>>,
}

impl DriveClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, DriveError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let files_url =
            Url::parse(DRIVE_FILES_URL).map_err(|e| DriveError::InvalidUrl(e.to_string()))?;

        let refresh_token = Some(config.drive_refresh_token.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            files_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: RwLock::new(refresh_token),
            access_token: RwLock::new(None),
        })
    }

    /// Files endpoint for `file_id`, kept to a single path segment.
    fn file_url(&self, file_id: &str) -> Result<Url, DriveError> {
        let mut url = self.files_url.clone();
        url.path_segments_mut()
            .map_err(|_| DriveError::InvalidUrl(self.files_url.to_string()))?
            .push(file_id);
        Ok(url)
    }

    pub async fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && self.refresh_token.read().await.is_some()
    }

    /// Replaces the refresh token and drops any cached access token.
    pub async fn set_refresh_token(&self, refresh_token: &str) {
        *self.refresh_token.write().await = Some(refresh_token.trim().to_string());
        *self.access_token.write().await = None;
        info!("Google Drive refresh token updated");
    }

    async fn access_token(&self) -> Result<String, DriveError> {
        let now = Utc::now();
        if let Some(cached) = self.access_token.read().await.as_ref() {
            if cached.is_fresh(now) {
                return Ok(cached.value.clone());
            }
        }

        let refresh_token = self
            .refresh_token
            .read()
            .await
            .clone()
            .ok_or(DriveError::NotConfigured)?;
        if self.client_id.is_empty() {
            return Err(DriveError::NotConfigured);
        }

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Drive token refresh failed");
            return Err(DriveError::Unauthorized(body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;

        let cached = CachedToken {
            value: token.access_token,
            expires_at: token_expiry(now, token.expires_in),
        };
        let value = cached.value.clone();
        *self.access_token.write().await = Some(cached);
        debug!("Drive access token refreshed");
        Ok(value)
    }

    /// One page of video files.
    pub async fn list_videos(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<DriveFileList, DriveError> {
        let token = self.access_token().await?;
        let fields = format!("nextPageToken, files({})", FILE_FIELDS);
        let page_size = page_size.to_string();

        let mut query = vec![
            ("q", VIDEO_QUERY),
            ("fields", fields.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(page_token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("pageToken", page_token));
        }

        let response = self
            .client
            .get(self.files_url.clone())
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| DriveError::InvalidResponse(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(DriveError::Unauthorized("access token rejected".into())),
            status => Err(DriveError::Status(status.as_u16())),
        }
    }

    /// Metadata for one file.
    pub async fn get_file(&self, file_id: &str) -> Result<DriveFile, DriveError> {
        let token = self.access_token().await?;
        let url = self.file_url(file_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| DriveError::InvalidResponse(e.to_string())),
            StatusCode::NOT_FOUND => Err(DriveError::FileNotFound),
            StatusCode::UNAUTHORIZED => Err(DriveError::Unauthorized("access token rejected".into())),
            status => Err(DriveError::Status(status.as_u16())),
        }
    }
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
