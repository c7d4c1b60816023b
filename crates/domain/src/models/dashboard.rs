//! Admin and moderator dashboard aggregates.

use serde::{Deserialize, Serialize};

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_movies: i64,
    pub total_comments: i64,
    pub active_invite_codes: i64,
}

/// Totals shown on the moderator dashboard.
///
/// `pending_comments` counts comments from the last 24 hours and
/// `recent_users` counts accounts created in the last 7 days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModStats {
    pub total_movies: i64,
    pub total_comments: i64,
    pub pending_comments: i64,
    pub recent_users: i64,
}

/// Window for "pending" comments on the moderator dashboard.
pub const PENDING_COMMENT_WINDOW_HOURS: i64 = 24;

/// Window for "recent" users on the moderator dashboard.
pub const RECENT_USER_WINDOW_DAYS: i64 = 7;

/// Query for the moderator comment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModCommentsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Restrict to comments from the pending window.
    #[serde(default)]
    pub recent: bool,
}
