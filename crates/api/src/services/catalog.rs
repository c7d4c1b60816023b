//! Imports movies from the third-party API and Google Drive.

use chrono::{Datelike, Utc};
use domain::models::movie::{Movie, NewMovie};
use domain::models::movie_source::DriveImportRequest;
use domain::services::{map_api_movie, map_drive_file, new_movie_imported, ImportError};
use persistence::repositories::{is_unique_violation, MovieRepository, NotificationRepository};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::middleware::metrics::record_import;
use crate::services::google_drive::{DriveClient, DriveError};
use crate::services::movie_api::{MovieApiClient, MovieApiError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Movie already imported")]
    AlreadyImported,

    #[error(transparent)]
    Mapping(#[from] ImportError),

    #[error("Movie API error: {0}")]
    MovieApi(#[from] MovieApiError),

    #[error("Google Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct CatalogService {
    movies: MovieRepository,
    notifications: NotificationRepository,
    movie_api: Arc<MovieApiClient>,
    drive: Arc<DriveClient>,
}

impl CatalogService {
    pub fn new(pool: PgPool, movie_api: Arc<MovieApiClient>, drive: Arc<DriveClient>) -> Self {
        Self {
            movies: MovieRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
            movie_api,
            drive,
        }
    }

    /// Imports one movie from the third-party catalog by its id or slug.
    pub async fn import_from_api(&self, api_id: &str, importer: Uuid) -> Result<Movie, CatalogError> {
        let api_id = api_id.trim();
        if self.movies.find_by_api_id(api_id).await?.is_some() {
            return Err(CatalogError::AlreadyImported);
        }

        let payload = self.movie_api.details(api_id).await?;
        let new_movie = map_api_movie(&payload, api_id, Utc::now().year(), Some(importer))?;

        self.store(new_movie, importer, "api").await
    }

    /// Imports a Drive video file, applying the caller's metadata overrides.
    pub async fn import_from_drive(
        &self,
        req: &DriveImportRequest,
        importer: Uuid,
    ) -> Result<Movie, CatalogError> {
        let file_id = req.file_id.trim();
        if self.movies.find_by_drive_file_id(file_id).await?.is_some() {
            return Err(CatalogError::AlreadyImported);
        }

        let file = self.drive.get_file(file_id).await?;
        let new_movie = map_drive_file(&file, req, Utc::now().year(), Some(importer))?;

        self.store(new_movie, importer, "google_drive").await
    }

    async fn store(
        &self,
        new_movie: NewMovie,
        importer: Uuid,
        source: &'static str,
    ) -> Result<Movie, CatalogError> {
        let movie: Movie = match self.movies.create(&new_movie).await {
            Ok(entity) => entity.into(),
            // A concurrent import of the same source id won.
            Err(e) if is_unique_violation(&e) => return Err(CatalogError::AlreadyImported),
            Err(e) => return Err(e.into()),
        };

        record_import(source);
        info!(movie_id = %movie.id, source, importer = %importer, "Movie imported");

        let notification = new_movie_imported(importer, movie.id, &movie.title);
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(movie_id = %movie.id, error = %e, "Failed to create import notification");
        }

        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_error_message_passes_through() {
        let err = CatalogError::from(ImportError::MissingVideo);
        assert_eq!(err.to_string(), "External movie has no playable video");
    }
}
