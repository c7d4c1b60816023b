//! Movie repository for database operations.

use domain::models::movie::{MovieSort, NewMovie, UpdateMovieRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MovieEntity, MovieSourceDb, RatingEntity};
use crate::metrics::QueryTimer;

const MOVIE_COLUMNS: &str = "id, title, description, genre, release_year, director, actors, \
     poster, video_url, source, api_id, drive_file_id, rating, rating_count, views, \
     uploaded_by, created_at, updated_at";

/// Shared filter: `$1` is an exact genre, `$2` an ILIKE pattern.
const LIST_FILTER: &str = "($1::text IS NULL OR $1 = ANY(genre)) \
     AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2 OR director ILIKE $2)";

/// Repository for catalog movies.
#[derive(Clone)]
pub struct MovieRepository {
    pool: PgPool,
}

impl MovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, movie: &NewMovie) -> Result<MovieEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_movie");
        let sql = format!(
            r#"
            INSERT INTO movies (
                title, description, genre, release_year, director, actors, poster,
                video_url, source, api_id, drive_file_id, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.genre)
            .bind(movie.release_year)
            .bind(&movie.director)
            .bind(&movie.actors)
            .bind(&movie.poster)
            .bind(&movie.video_url)
            .bind(MovieSourceDb::from(movie.source))
            .bind(&movie.api_id)
            .bind(&movie.drive_file_id)
            .bind(movie.uploaded_by)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_movie_by_id");
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_api_id(&self, api_id: &str) -> Result<Option<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_movie_by_api_id");
        let sql = format!("SELECT {} FROM movies WHERE api_id = $1", MOVIE_COLUMNS);
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(api_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_drive_file_id(
        &self,
        file_id: &str,
    ) -> Result<Option<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_movie_by_drive_file_id");
        let sql = format!("SELECT {} FROM movies WHERE drive_file_id = $1", MOVIE_COLUMNS);
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// One page of the catalog.
    pub async fn list(
        &self,
        genre: Option<&str>,
        pattern: Option<&str>,
        sort: MovieSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_movies");
        // ORDER BY comes from a fixed set of clauses, never from input.
        let sql = format!(
            "SELECT {} FROM movies WHERE {} ORDER BY {} LIMIT $3 OFFSET $4",
            MOVIE_COLUMNS,
            LIST_FILTER,
            sort.as_sql()
        );
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(genre)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn count(
        &self,
        genre: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_movies");
        let sql = format!("SELECT COUNT(*) FROM movies WHERE {}", LIST_FILTER);
        let result = sqlx::query_scalar::<_, i64>(&sql)
            .bind(genre)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Bumps the view counter and returns the updated row.
    pub async fn increment_views(&self, id: Uuid) -> Result<Option<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("increment_movie_views");
        let sql = format!(
            "UPDATE movies SET views = views + 1 WHERE id = $1 RETURNING {}",
            MOVIE_COLUMNS
        );
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Folds one rating into the running average in a single statement.
    ///
    /// Both columns are read and written by the same row update, so
    /// concurrent submissions serialize on the row lock and none is lost.
    pub async fn apply_rating(
        &self,
        id: Uuid,
        rating: f64,
    ) -> Result<Option<RatingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("apply_movie_rating");
        let result = sqlx::query_as::<_, RatingEntity>(
            r#"
            UPDATE movies SET
                rating = (rating * rating_count + $2) / (rating_count + 1),
                rating_count = rating_count + 1
            WHERE id = $1
            RETURNING rating, rating_count
            "#,
        )
        .bind(id)
        .bind(rating)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies the provided fields; absent ones keep their stored value.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateMovieRequest,
    ) -> Result<Option<MovieEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_movie");
        let sql = format!(
            r#"
            UPDATE movies SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                genre = COALESCE($4, genre),
                release_year = COALESCE($5, release_year),
                director = COALESCE($6, director),
                actors = COALESCE($7, actors),
                poster = COALESCE($8, poster),
                video_url = COALESCE($9, video_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );
        let result = sqlx::query_as::<_, MovieEntity>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.genre)
            .bind(changes.release_year)
            .bind(&changes.director)
            .bind(&changes.actors)
            .bind(&changes.poster)
            .bind(&changes.video_url)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Deletes a movie; comments, favorites and history rows cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_movie");
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
