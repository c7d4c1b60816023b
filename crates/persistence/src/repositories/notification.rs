//! Notification repository for database operations.

use domain::models::NewNotification;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{NotificationEntity, NotificationTypeDb, NotificationWithRelatedEntity};
use crate::metrics::QueryTimer;

/// Repository for the per-user notification inbox.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<NotificationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_notification");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (user_id, content, type, related_movie_id, related_comment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, content, type, read, related_movie_id, related_comment_id, created_at
            "#,
        )
        .bind(notification.user_id)
        .bind(&notification.content)
        .bind(NotificationTypeDb::from(notification.kind))
        .bind(notification.related_movie_id)
        .bind(notification.related_comment_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A user's notifications, newest first, with related movie and comment.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationWithRelatedEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications");
        let result = sqlx::query_as::<_, NotificationWithRelatedEntity>(
            r#"
            SELECT n.id, n.user_id, n.content, n.type, n.read,
                   n.related_movie_id, n.related_comment_id, n.created_at,
                   m.title AS movie_title, m.poster AS movie_poster,
                   c.content AS comment_content
            FROM notifications n
            LEFT JOIN movies m ON m.id = n.related_movie_id
            LEFT JOIN comments c ON c.id = n.related_comment_id
            WHERE n.user_id = $1
            ORDER BY n.created_at DESC, n.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_notification_by_id");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT id, user_id, content, type, read, related_movie_id, related_comment_id, created_at
            FROM notifications WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Option<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_notification_read");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            UPDATE notifications SET read = TRUE WHERE id = $1
            RETURNING id, user_id, content, type, read, related_movie_id, related_comment_id, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns the number of notifications that changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_all_notifications_read");
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_notification");
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn delete_all(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_all_notifications");
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
