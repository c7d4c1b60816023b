//! Comment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::comment::{Comment, CommentListItem, CommentView, MovieRef};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::author_summary;

/// Database row mapping for the comments table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentEntity> for Comment {
    fn from(entity: CommentEntity) -> Self {
        Self {
            id: entity.id,
            movie_id: entity.movie_id,
            user_id: entity.user_id,
            parent_id: entity.parent_id,
            content: entity.content,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Comment joined with its author's name and avatar.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthorEntity {
    #[sqlx(flatten)]
    pub comment: CommentEntity,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

impl CommentWithAuthorEntity {
    /// Builds the reader view; likes are loaded separately.
    pub fn into_view(self, likes: Vec<Uuid>) -> CommentView {
        let c = self.comment;
        CommentView {
            id: c.id,
            movie_id: c.movie_id,
            parent_id: c.parent_id,
            content: c.content,
            user: author_summary(c.user_id, self.author_name, self.author_avatar),
            likes,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// One like on a comment.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CommentLikeEntity {
    pub comment_id: Uuid,
    pub user_id: Uuid,
}

/// Comment row for moderation lists, with movie title and author.
#[derive(Debug, Clone, FromRow)]
pub struct CommentListEntity {
    pub id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub movie_id: Uuid,
    pub movie_title: String,
    pub user_id: Uuid,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

impl From<CommentListEntity> for CommentListItem {
    fn from(entity: CommentListEntity) -> Self {
        Self {
            id: entity.id,
            content: entity.content,
            parent_id: entity.parent_id,
            movie: MovieRef {
                id: entity.movie_id,
                title: entity.movie_title,
            },
            user: author_summary(entity.user_id, entity.author_name, entity.author_avatar),
            created_at: entity.created_at,
        }
    }
}
