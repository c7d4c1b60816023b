//! User account domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::movie::Movie;

/// Account roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Mod,
    Admin,
}

impl Role {
    /// Check if this role has at least the specified role level.
    /// Hierarchy: Admin > Mod > User
    pub fn has_at_least(&self, required: Role) -> bool {
        self.priority() >= required.priority()
    }

    /// Higher value = more privileges.
    fn priority(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Mod => 50,
            Role::User => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Mod => "mod",
            Role::Admin => "admin",
        }
    }

    pub fn all() -> &'static [Role] {
        &[Role::User, Role::Mod, Role::Admin]
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "mod" | "moderator" => Ok(Role::Mod),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)] // Never serialize password hash to API responses
    pub password_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub role: Role,
    pub invite_code: Option<String>,
    pub blocked: bool,
    pub block_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A block with no end date lasts until lifted; a dated block lapses on its own.
    pub fn is_blocked_at(&self, now: DateTime<Utc>) -> bool {
        is_block_active(self.blocked, self.block_until, now)
    }
}

/// Shared by the user model and the auth middleware's row check.
pub fn is_block_active(
    blocked: bool,
    block_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    blocked && block_until.map_or(true, |until| until > now)
}

/// End of a block that lasts `days` from `now`.
pub fn block_until_from(now: DateTime<Utc>, days: Option<u32>) -> Option<DateTime<Utc>> {
    days.map(|d| now + Duration::days(i64::from(d)))
}

/// Compact user view for back-office lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            avatar: user.avatar,
            blocked: user.blocked,
            created_at: user.created_at,
        }
    }
}

/// Author shown next to comments and likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

/// Request to register with an invite code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "shared::validation::validate_invite_code"))]
    pub invite_code: String,
}

/// Request to log in with email and password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token plus the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Partial profile update. A new password requires the current one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub avatar: Option<String>,

    pub current_password: Option<String>,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub new_password: Option<String>,
}

/// Admin request to change a user's role.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Moderator request to block or unblock a user. `duration` is in days;
/// without it a block lasts until lifted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlockUserRequest {
    pub blocked: bool,

    #[validate(range(min = 1, max = 3650, message = "Duration must be 1-3650 days"))]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatusResponse {
    pub is_favorite: bool,
}

/// One watched movie with the time it was last watched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub movie: Movie,
    pub watched_at: DateTime<Utc>,
}

/// Paginated user list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserSummary>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_users: i64,
}
