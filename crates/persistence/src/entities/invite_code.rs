//! Invite code entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::invite_code::{InviteCode, InviteUser};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the invite_codes table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteCodeEntity {
    pub id: Uuid,
    pub code: String,
    pub created_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub max_uses: i32,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<InviteCodeEntity> for InviteCode {
    fn from(entity: InviteCodeEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            created_by: entity.created_by,
            expires_at: entity.expires_at,
            max_uses: entity.max_uses,
            used_count: entity.used_count,
            created_at: entity.created_at,
        }
    }
}

/// Invite code joined with its creator's name and email.
#[derive(Debug, Clone, FromRow)]
pub struct InviteCodeWithCreatorEntity {
    #[sqlx(flatten)]
    pub invite_code: InviteCodeEntity,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

impl InviteCodeWithCreatorEntity {
    pub fn creator(&self) -> Option<InviteUser> {
        match (&self.creator_name, &self.creator_email) {
            (Some(name), Some(email)) => Some(InviteUser {
                id: self.invite_code.created_by,
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

/// A user who registered with a given invite code.
#[derive(Debug, Clone, FromRow)]
pub struct InviteCodeUseEntity {
    pub invite_code_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<InviteCodeUseEntity> for InviteUser {
    fn from(entity: InviteCodeUseEntity) -> Self {
        Self {
            id: entity.user_id,
            name: entity.name,
            email: entity.email,
        }
    }
}
