//! The authenticated caller.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use uuid::Uuid;

use crate::error::ApiError;

/// Inserted by the auth middleware after the token and the account have
/// been checked. `role` is read from the database, not the token, so role
/// changes and blocks apply to tokens already issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn has_at_least(&self, role: Role) -> bool {
        self.role.has_at_least(role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_at_least(Role::Mod)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}
