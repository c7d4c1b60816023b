//! Favorites and watch history repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MovieEntity, WatchHistoryEntity};
use crate::metrics::QueryTimer;

/// Repository for a user's favorites and watch history.
#[derive(Clone)]
pub struct LibraryRepository {
    pool: PgPool,
}

impl LibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Favorite movies, most recently added first.
    pub async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_favorites");
        let result = sqlx::query_as::<_, MovieEntity>(
            r#"
            SELECT m.*
            FROM user_favorites f
            JOIN movies m ON m.id = f.movie_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns false when the movie was already a favorite.
    pub async fn add_favorite(&self, user_id: Uuid, movie_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("add_favorite");
        let result = sqlx::query(
            "INSERT INTO user_favorites (user_id, movie_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }

    /// Returns false when the movie was not a favorite.
    pub async fn remove_favorite(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_favorite");
        let result = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn is_favorite(&self, user_id: Uuid, movie_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_favorite");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM user_favorites WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Adds the movie to the history or refreshes its timestamp.
    pub async fn record_watch(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<DateTime<Utc>, sqlx::Error> {
        let timer = QueryTimer::new("record_watch");
        let result = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            INSERT INTO watch_history (user_id, movie_id, watched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, movie_id) DO UPDATE SET watched_at = NOW()
            RETURNING watched_at
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Watched movies, most recent first.
    pub async fn list_watch_history(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WatchHistoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_watch_history");
        let result = sqlx::query_as::<_, WatchHistoryEntity>(
            r#"
            SELECT m.*, w.watched_at
            FROM watch_history w
            JOIN movies m ON m.id = w.movie_id
            WHERE w.user_id = $1
            ORDER BY w.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns the number of entries removed.
    pub async fn clear_watch_history(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_watch_history");
        let result = sqlx::query("DELETE FROM watch_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
