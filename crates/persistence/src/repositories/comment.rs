//! Comment repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CommentEntity, CommentLikeEntity, CommentListEntity, CommentWithAuthorEntity};
use crate::metrics::QueryTimer;

const COMMENT_COLUMNS: &str = "id, movie_id, user_id, parent_id, content, created_at, updated_at";

const WITH_AUTHOR: &str = r#"
    SELECT c.id, c.movie_id, c.user_id, c.parent_id, c.content, c.created_at, c.updated_at,
           u.name AS author_name, u.avatar AS author_avatar
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

const LIST_ROWS: &str = r#"
    SELECT c.id, c.content, c.parent_id, c.created_at,
           m.id AS movie_id, m.title AS movie_title,
           u.id AS user_id, u.name AS author_name, u.avatar AS author_avatar
    FROM comments c
    JOIN movies m ON m.id = c.movie_id
    JOIN users u ON u.id = c.user_id
"#;

/// Repository for comments and comment likes.
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
    ) -> Result<CommentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_comment");
        let sql = format!(
            "INSERT INTO comments (movie_id, user_id, parent_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COMMENT_COLUMNS
        );
        let result = sqlx::query_as::<_, CommentEntity>(&sql)
            .bind(movie_id)
            .bind(user_id)
            .bind(parent_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_comment_by_id");
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        let result = sqlx::query_as::<_, CommentEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_with_author(
        &self,
        id: Uuid,
    ) -> Result<Option<CommentWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_comment_with_author");
        let sql = format!("{} WHERE c.id = $1", WITH_AUTHOR);
        let result = sqlx::query_as::<_, CommentWithAuthorEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn update_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Option<CommentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_comment");
        let sql = format!(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );
        let result = sqlx::query_as::<_, CommentEntity>(&sql)
            .bind(id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Deletes a comment and its replies together.
    ///
    /// Returns the number of comments removed, 0 if `id` did not exist.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_comment_cascade");
        let result = self.delete_in_tx(id).await;
        timer.record();
        result
    }

    async fn delete_in_tx(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let replies = sqlx::query("DELETE FROM comments WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let removed = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        tx.commit().await?;
        tracing::debug!(comment_id = %id, replies, "Comment deleted");
        Ok(removed + replies)
    }

    /// Top-level comments on a movie, newest first.
    pub async fn top_level_for_movie(
        &self,
        movie_id: Uuid,
    ) -> Result<Vec<CommentWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_movie_comments");
        let sql = format!(
            "{} WHERE c.movie_id = $1 AND c.parent_id IS NULL ORDER BY c.created_at DESC, c.id DESC",
            WITH_AUTHOR
        );
        let result = sqlx::query_as::<_, CommentWithAuthorEntity>(&sql)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Replies to the given parents, oldest first.
    pub async fn replies_for_parents(
        &self,
        parent_ids: &[Uuid],
    ) -> Result<Vec<CommentWithAuthorEntity>, sqlx::Error> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_comment_replies");
        let sql = format!(
            "{} WHERE c.parent_id = ANY($1) ORDER BY c.created_at ASC, c.id ASC",
            WITH_AUTHOR
        );
        let result = sqlx::query_as::<_, CommentWithAuthorEntity>(&sql)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn likes_for_comments(
        &self,
        comment_ids: &[Uuid],
    ) -> Result<Vec<CommentLikeEntity>, sqlx::Error> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_comment_likes");
        let result = sqlx::query_as::<_, CommentLikeEntity>(
            r#"
            SELECT comment_id, user_id FROM comment_likes
            WHERE comment_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// User ids that like one comment, in the order they liked it.
    pub async fn likes(&self, comment_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("list_likes_for_comment");
        let result = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM comment_likes WHERE comment_id = $1 ORDER BY created_at ASC",
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns false when the user already liked the comment.
    pub async fn like(&self, comment_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("like_comment");
        let result = sqlx::query(
            "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }

    /// Returns false when the user had not liked the comment.
    pub async fn unlike(&self, comment_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("unlike_comment");
        let result =
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(&self.pool)
                .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Everything one user has written, newest first.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CommentListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_comments_by_user");
        let sql = format!(
            "{} WHERE c.user_id = $1 ORDER BY c.created_at DESC, c.id DESC",
            LIST_ROWS
        );
        let result = sqlx::query_as::<_, CommentListEntity>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// One page of all comments, newest first, optionally limited to those
    /// created after `since`. `pattern` is an ILIKE pattern on the content.
    pub async fn list_page(
        &self,
        pattern: Option<&str>,
        since: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_comments_page");
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL OR c.content ILIKE $1)
              AND ($2::timestamptz IS NULL OR c.created_at > $2)
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $3 OFFSET $4"#,
            LIST_ROWS
        );
        let result = sqlx::query_as::<_, CommentListEntity>(&sql)
            .bind(pattern)
            .bind(since)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn count(
        &self,
        pattern: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_comments");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE ($1::text IS NULL OR content ILIKE $1)
              AND ($2::timestamptz IS NULL OR created_at > $2)
            "#,
        )
        .bind(pattern)
        .bind(since)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
