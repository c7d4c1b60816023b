use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use persistence::repositories::{CHECK_VIOLATION, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use serde::Serialize;
use shared::pagination::PaginationError;
use thiserror::Error;

use crate::services::{AuthError, CatalogError, DriveError, MovieApiError, OAuthError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    /// A third-party service call failed.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::UpstreamFailure(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "upstream_failure", msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => ApiError::Conflict("Resource already exists".into()),
                Some(FOREIGN_KEY_VIOLATION) => {
                    ApiError::NotFound("Referenced resource not found".into())
                }
                Some(CHECK_VIOLATION) => ApiError::Validation("Invalid value".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .collect();

        let message = match messages.as_slice() {
            [] => "Invalid request".to_string(),
            [single] => single.clone(),
            many => many.join("; "),
        };

        ApiError::Validation(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Validation("Email already exists".into()),
            AuthError::InviteRejected(reason) => ApiError::Validation(reason.message().into()),
            AuthError::InvalidCredentials => ApiError::Validation("Invalid credentials".into()),
            AuthError::WrongCurrentPassword | AuthError::CurrentPasswordRequired => {
                ApiError::Validation(err.to_string())
            }
            AuthError::AccountBlocked => ApiError::Forbidden("Account is blocked".into()),
            AuthError::UserNotFound => ApiError::NotFound("User not found".into()),
            AuthError::DatabaseError(e) => e.into(),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
        }
    }
}

impl From<MovieApiError> for ApiError {
    fn from(err: MovieApiError) -> Self {
        match err {
            MovieApiError::Status(404) => ApiError::NotFound("Movie not found in external API".into()),
            other => ApiError::UpstreamFailure(format!("Failed to fetch from movie API: {}", other)),
        }
    }
}

impl From<DriveError> for ApiError {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::NotConfigured => {
                ApiError::ServiceUnavailable("Google Drive is not configured".into())
            }
            DriveError::FileNotFound => ApiError::NotFound("Drive file not found".into()),
            other => ApiError::UpstreamFailure(format!("Google Drive request failed: {}", other)),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::InvalidState => ApiError::Unauthorized("Invalid OAuth state".into()),
            OAuthError::EmailNotVerified => ApiError::Forbidden(err.to_string()),
            OAuthError::Signing => ApiError::Internal(err.to_string()),
            other => ApiError::UpstreamFailure(format!("Google sign-in failed: {}", other)),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AlreadyImported => {
                ApiError::Validation("Movie has already been imported".into())
            }
            CatalogError::Mapping(e) => ApiError::Validation(e.to_string()),
            CatalogError::MovieApi(e) => e.into(),
            CatalogError::Drive(e) => e.into(),
            CatalogError::Database(e) => e.into(),
        }
    }
}
