//! Minimum-role guards. Layered inside `require_user_auth`.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::Role;

use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Allows the request when the caller holds at least `required`.
pub fn check_role(user: Option<&CurrentUser>, required: Role) -> Result<(), ApiError> {
    match user {
        None => Err(ApiError::Unauthorized("Authentication required".to_string())),
        Some(user) if user.has_at_least(required) => Ok(()),
        Some(user) => {
            tracing::debug!(user_id = %user.id, role = %user.role, required = %required, "Access denied");
            Err(ApiError::Forbidden("Access denied".to_string()))
        }
    }
}

async fn require_role(required: Role, req: Request<Body>, next: Next) -> Response {
    match check_role(req.extensions().get::<CurrentUser>(), required) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

/// Moderators and admins.
pub async fn require_mod(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Mod, req, next).await
}

pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Admin, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_mod_routes() {
        assert!(matches!(
            check_role(Some(&user(Role::User)), Role::Mod),
            Err(ApiError::Forbidden(_))
        ));
        assert!(check_role(Some(&user(Role::Mod)), Role::Mod).is_ok());
        assert!(check_role(Some(&user(Role::Admin)), Role::Mod).is_ok());
    }

    #[test]
    fn test_admin_routes() {
        assert!(check_role(Some(&user(Role::User)), Role::Admin).is_err());
        assert!(check_role(Some(&user(Role::Mod)), Role::Admin).is_err());
        assert!(check_role(Some(&user(Role::Admin)), Role::Admin).is_ok());
    }

    #[test]
    fn test_missing_user() {
        assert!(matches!(
            check_role(None, Role::User),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
