//! Registration, login, Google sign-in and profile credential changes.

use chrono::Utc;
use domain::models::invite_code::{InviteCode, InviteRejection};
use domain::models::user::{RegisterRequest, UpdateProfileRequest, User};
use persistence::entities::NewUserRecord;
use persistence::repositories::{is_unique_violation, InviteCodeRepository, UserRepository};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::services::google_oauth::GoogleProfile;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    InviteRejected(InviteRejection),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("Current password is required to set a new password")]
    CurrentPasswordRequired,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A signed-in user and their session token.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: UserRepository,
    invites: InviteCodeRepository,
    jwt: Arc<JwtConfig>,
}

/// Emails are compared and stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            invites: InviteCodeRepository::new(pool),
            jwt,
        }
    }

    fn issue(&self, user: User) -> Result<AuthResult, AuthError> {
        let issued = self.jwt.generate_token(user.id, user.role.as_str())?;
        Ok(AuthResult {
            user,
            token: issued.token,
        })
    }

    /// Creates a password account, redeeming the invite code atomically.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResult, AuthError> {
        let email = normalize_email(&req.email);
        let code = req.invite_code.trim();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let invite: InviteCode = self
            .invites
            .find_by_code(code)
            .await?
            .ok_or(AuthError::InviteRejected(InviteRejection::Invalid))?
            .into();
        invite
            .check(Utc::now())
            .map_err(AuthError::InviteRejected)?;

        let record = NewUserRecord {
            name: req.name.trim().to_string(),
            email,
            password_hash: hash_password(&req.password)?,
            invite_code: invite.code.clone(),
        };

        let created = match self.users.register_with_invite(&record, invite.id).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        let Some(entity) = created else {
            // Lost a race for the last use, or the code expired in between.
            let rejection = self.current_rejection(code).await?;
            return Err(AuthError::InviteRejected(rejection));
        };

        let user: User = entity.into();
        info!(user_id = %user.id, invite_code = %invite.code, "User registered");
        self.issue(user)
    }

    async fn current_rejection(&self, code: &str) -> Result<InviteRejection, AuthError> {
        let rejection = match self.invites.find_by_code(code).await? {
            None => InviteRejection::Invalid,
            Some(entity) => InviteCode::from(entity)
                .check(Utc::now())
                .err()
                .unwrap_or(InviteRejection::Exhausted),
        };
        Ok(rejection)
    }

    /// Unknown email, a Google-only account and a wrong password all read as
    /// invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user: User = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_blocked_at(Utc::now()) {
            return Err(AuthError::AccountBlocked);
        }

        info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Signs in with a Google profile: by Google id, then by email (linking
    /// the Google id), otherwise a new account with role `user`.
    ///
    /// The flag is true when an account was created.
    pub async fn oauth_login(&self, profile: &GoogleProfile) -> Result<(AuthResult, bool), AuthError> {
        let email = normalize_email(&profile.email);

        let (entity, created) = match self.users.find_by_google_id(&profile.sub).await? {
            Some(entity) => (entity, false),
            None => match self.users.find_by_email(&email).await? {
                Some(existing) => {
                    let linked = self
                        .users
                        .link_google_id(existing.id, &profile.sub, profile.picture.as_deref())
                        .await?;
                    (linked, false)
                }
                None => {
                    let entity = self
                        .users
                        .create_oauth_user(
                            &profile.display_name(),
                            &email,
                            profile.picture.as_deref(),
                            &profile.sub,
                        )
                        .await?;
                    info!(user_id = %entity.id, "User created from Google sign-in");
                    (entity, true)
                }
            },
        };

        let user: User = entity.into();
        if user.is_blocked_at(Utc::now()) {
            return Err(AuthError::AccountBlocked);
        }
        Ok((self.issue(user)?, created))
    }

    /// Applies a profile update. A new password needs the current one,
    /// except for accounts that never had a password.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        let user: User = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .into();

        let password_hash = match req.new_password.as_deref() {
            None => None,
            Some(new_password) => {
                if let Some(existing) = user.password_hash.as_deref() {
                    let current = req
                        .current_password
                        .as_deref()
                        .ok_or(AuthError::CurrentPasswordRequired)?;
                    if !verify_password(current, existing)? {
                        return Err(AuthError::WrongCurrentPassword);
                    }
                }
                Some(hash_password(new_password)?)
            }
        };

        let updated = self
            .users
            .update_profile(
                user_id,
                req.name.as_deref().map(str::trim),
                req.avatar.as_deref(),
                password_hash.as_deref(),
            )
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Linh@Example.COM "), "linh@example.com");
    }

    #[test]
    fn test_invite_rejection_messages_surface() {
        assert_eq!(
            AuthError::InviteRejected(InviteRejection::Exhausted).to_string(),
            "Invite code exhausted"
        );
        assert_eq!(
            AuthError::InviteRejected(InviteRejection::Expired).to_string(),
            "Invite code has expired"
        );
    }
}
