//! Google sign-in (authorization code flow).

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use shared::crypto::{hmac_sha256_hex, random_token, verify_hmac_sha256_hex};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::config::{GoogleConfig, ServerConfig};

pub const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPES: &str = "openid email profile";

/// How long a consent round trip may take.
pub const STATE_TTL_SECS: i64 = 600;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid OAuth state")]
    InvalidState,

    #[error("Google account has no verified email")]
    EmailNotVerified,

    #[error("Google rejected the authorization code: {0}")]
    CodeRejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from Google: {0}")]
    InvalidResponse(String),

    #[error("Failed to sign OAuth state")]
    Signing,
}

/// Profile fields read from the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleProfile {
    /// Display name, falling back to the email's local part.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or_default().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    state_secret: Vec<u8>,
}

impl GoogleOAuthClient {
    /// `state_secret` signs the `state` parameter; the JWT secret is used.
    pub fn new(
        google: &GoogleConfig,
        server: &ServerConfig,
        state_secret: &str,
    ) -> Result<Self, OAuthError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(google.timeout_ms))
            .build()?;

        let redirect_url = if google.redirect_url.is_empty() {
            format!(
                "{}/api/auth/google/callback",
                server.client_url.trim_end_matches('/')
            )
        } else {
            google.redirect_url.clone()
        };

        Ok(Self {
            client,
            client_id: google.client_id.clone(),
            client_secret: google.client_secret.clone(),
            redirect_url,
            state_secret: state_secret.as_bytes().to_vec(),
        })
    }

    /// Consent screen URL carrying a freshly signed state.
    pub fn authorize_url(&self) -> Result<Url, OAuthError> {
        let state = self.sign_state(Utc::now().timestamp())?;
        Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state.as_str()),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| OAuthError::InvalidResponse(e.to_string()))
    }

    /// `nonce.issued_at.signature`
    fn sign_state(&self, issued_at: i64) -> Result<String, OAuthError> {
        let payload = format!("{}.{}", random_token(16), issued_at);
        let signature =
            hmac_sha256_hex(&self.state_secret, &payload).map_err(|_| OAuthError::Signing)?;
        Ok(format!("{}.{}", payload, signature))
    }

    /// Accepts a state signed by this service within [`STATE_TTL_SECS`].
    pub fn verify_state(&self, state: &str, now: i64) -> Result<(), OAuthError> {
        let (payload, signature) = state.rsplit_once('.').ok_or(OAuthError::InvalidState)?;
        if !verify_hmac_sha256_hex(&self.state_secret, payload, signature) {
            return Err(OAuthError::InvalidState);
        }

        let issued_at: i64 = payload
            .rsplit_once('.')
            .and_then(|(_, ts)| ts.parse().ok())
            .ok_or(OAuthError::InvalidState)?;
        if now - issued_at > STATE_TTL_SECS || issued_at > now + 60 {
            return Err(OAuthError::InvalidState);
        }
        Ok(())
    }

    /// Trades the authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Google code exchange failed");
            return Err(OAuthError::CodeRejected(body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;
        Ok(token.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, OAuthError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?;

        let profile: GoogleProfile = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        if !profile.email_verified {
            return Err(OAuthError::EmailNotVerified);
        }
        Ok(profile)
    }
}

impl std::fmt::Debug for GoogleOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthClient")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuthClient {
        let google = GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            ..Default::default()
        };
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            client_url: "http://localhost:3000/".to_string(),
        };
        GoogleOAuthClient::new(&google, &server, "state-secret-at-least-16").unwrap()
    }

    #[test]
    fn test_default_redirect_url() {
        assert_eq!(
            client().redirect_url,
            "http://localhost:3000/api/auth/google/callback"
        );
    }

    #[test]
    fn test_authorize_url_params() {
        let url = client().authorize_url().unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email profile");
        assert!(params.contains_key("state"));
    }

    #[test]
    fn test_state_round_trip() {
        let oauth = client();
        let now = Utc::now().timestamp();
        let state = oauth.sign_state(now).unwrap();
        assert!(oauth.verify_state(&state, now + 5).is_ok());
    }

    #[test]
    fn test_state_expired_or_tampered() {
        let oauth = client();
        let now = Utc::now().timestamp();
        let state = oauth.sign_state(now).unwrap();

        assert!(oauth.verify_state(&state, now + STATE_TTL_SECS + 1).is_err());

        let tampered = state.replacen('.', ".9", 1);
        assert!(oauth.verify_state(&tampered, now).is_err());
        assert!(oauth.verify_state("garbage", now).is_err());
    }

    #[test]
    fn test_display_name_fallback() {
        let profile = GoogleProfile {
            sub: "1".into(),
            email: "linh@example.com".into(),
            email_verified: true,
            name: None,
            picture: None,
        };
        assert_eq!(profile.display_name(), "linh");
    }
}
