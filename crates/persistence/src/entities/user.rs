//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user::{AuthorSummary, Role, User, UserSummary};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    User,
    Mod,
    Admin,
}

impl From<UserRoleDb> for Role {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::User => Role::User,
            UserRoleDb::Mod => Role::Mod,
            UserRoleDb::Admin => Role::Admin,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::User => UserRoleDb::User,
            Role::Mod => UserRoleDb::Mod,
            Role::Admin => UserRoleDb::Admin,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRoleDb,
    pub invite_code: Option<String>,
    pub blocked: bool,
    pub block_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            password_hash: entity.password_hash,
            google_id: entity.google_id,
            avatar: entity.avatar,
            role: entity.role.into(),
            invite_code: entity.invite_code,
            blocked: entity.blocked,
            block_until: entity.block_until,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<UserEntity> for UserSummary {
    fn from(entity: UserEntity) -> Self {
        User::from(entity).into()
    }
}

/// Id and role columns read by the auth middleware on every request.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccessEntity {
    pub id: Uuid,
    pub role: UserRoleDb,
    pub blocked: bool,
    pub block_until: Option<DateTime<Utc>>,
}

/// Columns for inserting a password account.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub invite_code: String,
}

/// Author columns joined onto comment rows.
pub fn author_summary(id: Uuid, name: String, avatar: Option<String>) -> AuthorSummary {
    AuthorSummary { id, name, avatar }
}
