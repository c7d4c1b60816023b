//! Invite codes gating self-registration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Uses allowed when the creator does not say otherwise.
pub const DEFAULT_MAX_USES: i32 = 1;

/// Days a new code stays valid when the creator does not say otherwise.
pub const DEFAULT_VALIDITY_DAYS: i64 = 7;

/// Represents an invite code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    pub id: Uuid,
    pub code: String,
    pub created_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub max_uses: i32,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Why an invite code cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteRejection {
    /// No code with that value exists.
    Invalid,
    Expired,
    Exhausted,
}

impl InviteRejection {
    pub fn message(&self) -> &'static str {
        match self {
            InviteRejection::Invalid => "Invalid invite code",
            InviteRejection::Expired => "Invite code has expired",
            InviteRejection::Exhausted => "Invite code exhausted",
        }
    }
}

impl fmt::Display for InviteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl InviteCode {
    /// Expiry is checked before the usage cap.
    ///
    /// This is the read-only check. Registration still relies on the
    /// conditional increment in storage, which repeats both conditions.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), InviteRejection> {
        if self.expires_at < now {
            return Err(InviteRejection::Expired);
        }
        if self.used_count >= self.max_uses {
            return Err(InviteRejection::Exhausted);
        }
        Ok(())
    }

    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.used_count).max(0)
    }
}

/// Expiry timestamp for a code issued at `now`.
pub fn expiry_from(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now + Duration::days(days)
}

fn default_max_uses() -> i32 {
    DEFAULT_MAX_USES
}

fn default_validity_days() -> i64 {
    DEFAULT_VALIDITY_DAYS
}

/// Request to issue a new invite code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteCodeRequest {
    /// Maximum uses (1-1000, default: 1)
    #[serde(default = "default_max_uses")]
    #[validate(range(min = 1, max = 1000, message = "maxUses must be between 1 and 1000"))]
    pub max_uses: i32,

    /// Days until expiry (1-365, default: 7)
    #[serde(default = "default_validity_days")]
    #[validate(range(
        min = 1,
        max = 365,
        message = "expiresInDays must be between 1 and 365"
    ))]
    pub expires_in_days: i64,
}

impl Default for CreateInviteCodeRequest {
    fn default() -> Self {
        Self {
            max_uses: DEFAULT_MAX_USES,
            expires_in_days: DEFAULT_VALIDITY_DAYS,
        }
    }
}

/// Name and email of a user attached to an invite code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Invite code with its creator and the accounts registered through it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeDetails {
    #[serde(flatten)]
    pub invite_code: InviteCode,
    pub creator: Option<InviteUser>,
    pub used_by: Vec<InviteUser>,
}

/// Result of the public validity check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteValidationResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl InviteValidationResponse {
    pub fn accepted(expires_at: DateTime<Utc>) -> Self {
        Self {
            valid: true,
            message: "Invite code is valid".to_string(),
            expires_at: Some(expires_at),
        }
    }

    pub fn rejected(reason: InviteRejection) -> Self {
        Self {
            valid: false,
            message: reason.message().to_string(),
            expires_at: None,
        }
    }
}

/// Paginated invite code list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeListResponse {
    pub invite_codes: Vec<InviteCodeDetails>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_invite_codes: i64,
}
