//! Registration, login and Google sign-in.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use chrono::Utc;
use domain::models::user::{AuthResponse, LoginRequest, RegisterRequest, User};
use persistence::repositories::UserRepository;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_registration;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let result = state.auth_service().register(&request).await?;
    record_registration("password");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: result.token,
            user: result.user,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let result = state
        .auth_service()
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        token: result.token,
        user: result.user,
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<User>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// GET /api/auth/google
pub async fn google_authorize(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let oauth = state
        .google_oauth
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Google sign-in is not configured".into()))?;
    let url = oauth.authorize_url()?;
    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/google/callback
///
/// Always redirects to the client: with a token on success, to the login
/// page with `error=oauth_failed` otherwise.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    let client_url = state.config.server.client_url.trim_end_matches('/');

    match complete_google_sign_in(&state, query).await {
        Ok(token) => Redirect::to(&format!("{}/oauth-callback?token={}", client_url, token)),
        Err(e) => {
            warn!(error = %e, "Google sign-in failed");
            Redirect::to(&format!("{}/login?error=oauth_failed", client_url))
        }
    }
}

async fn complete_google_sign_in(
    state: &AppState,
    query: GoogleCallbackQuery,
) -> Result<String, ApiError> {
    let oauth = state
        .google_oauth
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Google sign-in is not configured".into()))?;

    if let Some(error) = query.error {
        return Err(ApiError::Unauthorized(format!("Google returned {}", error)));
    }
    let code = query
        .code
        .ok_or_else(|| ApiError::Validation("Missing authorization code".into()))?;
    let oauth_state = query
        .state
        .ok_or_else(|| ApiError::Validation("Missing OAuth state".into()))?;

    oauth.verify_state(&oauth_state, Utc::now().timestamp())?;
    let access_token = oauth.exchange_code(&code).await?;
    let profile = oauth.fetch_profile(&access_token).await?;

    let (result, created) = state.auth_service().oauth_login(&profile).await?;
    if created {
        record_registration("google");
    }
    info!(user_id = %result.user.id, created, "Google sign-in completed");
    Ok(result.token)
}
