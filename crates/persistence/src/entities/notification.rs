//! Notification entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::notification::{
    Notification, NotificationType, NotificationView, RelatedComment, RelatedMovie,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for notification_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
pub enum NotificationTypeDb {
    NewMovie,
    CommentReply,
    AccountBlocked,
    System,
}

impl From<NotificationTypeDb> for NotificationType {
    fn from(db: NotificationTypeDb) -> Self {
        match db {
            NotificationTypeDb::NewMovie => NotificationType::NewMovie,
            NotificationTypeDb::CommentReply => NotificationType::CommentReply,
            NotificationTypeDb::AccountBlocked => NotificationType::AccountBlocked,
            NotificationTypeDb::System => NotificationType::System,
        }
    }
}

impl From<NotificationType> for NotificationTypeDb {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::NewMovie => NotificationTypeDb::NewMovie,
            NotificationType::CommentReply => NotificationTypeDb::CommentReply,
            NotificationType::AccountBlocked => NotificationTypeDb::AccountBlocked,
            NotificationType::System => NotificationTypeDb::System,
        }
    }
}

/// Database row mapping for the notifications table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[sqlx(rename = "type")]
    pub kind: NotificationTypeDb,
    pub read: bool,
    pub related_movie_id: Option<Uuid>,
    pub related_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(entity: NotificationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            content: entity.content,
            kind: entity.kind.into(),
            read: entity.read,
            related_movie_id: entity.related_movie_id,
            related_comment_id: entity.related_comment_id,
            created_at: entity.created_at,
        }
    }
}

/// Notification joined with the title/poster of its movie and text of its comment.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationWithRelatedEntity {
    #[sqlx(flatten)]
    pub notification: NotificationEntity,
    pub movie_title: Option<String>,
    pub movie_poster: Option<String>,
    pub comment_content: Option<String>,
}

impl From<NotificationWithRelatedEntity> for NotificationView {
    fn from(entity: NotificationWithRelatedEntity) -> Self {
        let n = entity.notification;
        let related_movie = n
            .related_movie_id
            .zip(entity.movie_title)
            .map(|(id, title)| RelatedMovie {
                id,
                title,
                poster: entity.movie_poster,
            });
        let related_comment = n
            .related_comment_id
            .zip(entity.comment_content)
            .map(|(id, content)| RelatedComment { id, content });

        Self {
            notification: n.into(),
            related_movie,
            related_comment,
        }
    }
}
