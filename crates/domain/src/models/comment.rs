//! Two-level comment threads on movies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::user::{AuthorSummary, Role};

/// A stored comment. `parent_id` is set only on replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Only the author may edit.
    pub fn can_edit(&self, caller: Uuid) -> bool {
        self.user_id == caller
    }

    /// The author, or any moderator or admin, may delete.
    pub fn can_delete(&self, caller: Uuid, caller_role: Role) -> bool {
        self.user_id == caller || caller_role.has_at_least(Role::Mod)
    }

    /// Checks that a new comment on `movie_id` may reply to `self`.
    pub fn check_reply_target(&self, movie_id: Uuid) -> Result<(), ReplyError> {
        if self.is_reply() {
            return Err(ReplyError::NestedReply);
        }
        if self.movie_id != movie_id {
            return Err(ReplyError::DifferentMovie);
        }
        Ok(())
    }
}

/// Reasons a reply target is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("Cannot reply to a reply")]
    NestedReply,
    #[error("Parent comment belongs to a different movie")]
    DifferentMovie,
}

/// A comment as shown to readers, with author and likes resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub user: AuthorSummary,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A top-level comment with its replies, oldest reply first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

/// Attaches replies to their parents.
///
/// Parent order is kept as given; replies keep their relative order.
/// Replies whose parent is not in `top_level` are dropped.
pub fn assemble_threads(
    top_level: Vec<CommentView>,
    replies: Vec<CommentView>,
) -> Vec<CommentThread> {
    let mut by_parent: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id {
            by_parent.entry(parent_id).or_default().push(reply);
        }
    }

    top_level
        .into_iter()
        .map(|comment| {
            let replies = by_parent.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect()
}

/// Request to post a comment or a reply.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(alias = "movie")]
    pub movie_id: Uuid,

    #[validate(
        length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,

    #[serde(default, alias = "parentComment")]
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(
        length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,
}

/// User ids that like a comment.
#[derive(Debug, Clone, Serialize)]
pub struct LikesResponse {
    pub likes: Vec<Uuid>,
}

/// Movie reference shown next to back-office comment rows.
#[derive(Debug, Clone, Serialize)]
pub struct MovieRef {
    pub id: Uuid,
    pub title: String,
}

/// Flat comment row for moderation lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListItem {
    pub id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub movie: MovieRef,
    pub user: AuthorSummary,
    pub created_at: DateTime<Utc>,
}

/// Paginated comment list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    pub comments: Vec<CommentListItem>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_comments: i64,
}
