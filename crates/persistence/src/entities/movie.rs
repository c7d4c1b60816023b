//! Movie entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::movie::{Movie, MovieSource};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for movie_source that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "movie_source", rename_all = "snake_case")]
pub enum MovieSourceDb {
    Api,
    GoogleDrive,
}

impl From<MovieSourceDb> for MovieSource {
    fn from(db: MovieSourceDb) -> Self {
        match db {
            MovieSourceDb::Api => MovieSource::Api,
            MovieSourceDb::GoogleDrive => MovieSource::GoogleDrive,
        }
    }
}

impl From<MovieSource> for MovieSourceDb {
    fn from(source: MovieSource) -> Self {
        match source {
            MovieSource::Api => MovieSourceDb::Api,
            MovieSource::GoogleDrive => MovieSourceDb::GoogleDrive,
        }
    }
}

/// Database row mapping for the movies table.
#[derive(Debug, Clone, FromRow)]
pub struct MovieEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub poster: Option<String>,
    pub video_url: String,
    pub source: MovieSourceDb,
    pub api_id: Option<String>,
    pub drive_file_id: Option<String>,
    pub rating: f64,
    pub rating_count: i32,
    pub views: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MovieEntity> for Movie {
    fn from(entity: MovieEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            genre: entity.genre,
            release_year: entity.release_year,
            director: entity.director,
            actors: entity.actors,
            poster: entity.poster,
            video_url: entity.video_url,
            source: entity.source.into(),
            api_id: entity.api_id,
            drive_file_id: entity.drive_file_id,
            rating: entity.rating,
            rating_count: entity.rating_count,
            views: entity.views,
            uploaded_by: entity.uploaded_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Rating aggregate returned by the rating update.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct RatingEntity {
    pub rating: f64,
    pub rating_count: i32,
}

/// A watch history row joined with its movie.
#[derive(Debug, Clone, FromRow)]
pub struct WatchHistoryEntity {
    #[sqlx(flatten)]
    pub movie: MovieEntity,
    pub watched_at: DateTime<Utc>,
}

impl From<WatchHistoryEntity> for domain::models::user::WatchHistoryEntry {
    fn from(entity: WatchHistoryEntity) -> Self {
        Self {
            movie: entity.movie.into(),
            watched_at: entity.watched_at,
        }
    }
}
