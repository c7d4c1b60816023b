//! Bearer token authentication.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use domain::models::user::is_block_active;
use persistence::repositories::UserRepository;
use shared::jwt::{extract_user_id, JwtConfig};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// User id from a signed, unexpired token.
pub fn authenticate_token(jwt: &JwtConfig, token: &str) -> Result<Uuid, ApiError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;
    extract_user_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

async fn resolve_user(state: &AppState, token: Option<String>) -> Result<CurrentUser, ApiError> {
    let token =
        token.ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?;

    let user_id = authenticate_token(&state.jwt, &token)?;

    let access = UserRepository::new(state.pool.clone())
        .find_access(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if is_block_active(access.blocked, access.block_until, Utc::now()) {
        return Err(ApiError::Forbidden("Account is blocked".to_string()));
    }

    Ok(CurrentUser {
        id: access.id,
        role: access.role.into(),
    })
}

/// Rejects requests without a valid token for an existing, unblocked account
/// and attaches the [`CurrentUser`] for handlers and later middleware.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    match resolve_user(&state, token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
