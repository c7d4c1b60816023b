//! Moderator access to the third-party catalog and Google Drive.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::common::MessageResponse;
use domain::models::movie::Movie;
use domain::models::movie_source::{
    ApiImportRequest, DriveAuthRequest, DriveFile, DriveFileList, DriveImportRequest,
    DriveListQuery, ExternalSearchQuery,
};
use serde_json::Value;
use shared::pagination::PageRequest;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// GET /api/movie-sources/api/search
pub async fn search_api(
    State(state): State<AppState>,
    Query(query): Query<ExternalSearchQuery>,
) -> Result<Json<Value>, ApiError> {
    query.validate()?;
    let page = PageRequest::new(
        query.page,
        query.limit,
        state.config.catalog.external_page_size,
    )?;
    let payload = state
        .movie_api
        .search(&query.keyword, page.page, page.limit)
        .await?;
    Ok(Json(payload))
}

/// GET /api/movie-sources/api/details/:id
pub async fn api_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.movie_api.details(&id).await?))
}

/// POST /api/movie-sources/api/import
pub async fn import_from_api(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ApiImportRequest>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    request.validate()?;
    let movie = state
        .catalog_service()
        .import_from_api(&request.api_movie_id, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// GET /api/movie-sources/drive/list
pub async fn list_drive_files(
    State(state): State<AppState>,
    Query(query): Query<DriveListQuery>,
) -> Result<Json<DriveFileList>, ApiError> {
    query.validate()?;
    let files = state
        .drive
        .list_videos(query.page_size(), query.page_token.as_deref())
        .await?;
    Ok(Json(files))
}

/// GET /api/movie-sources/drive/file/:file_id
pub async fn get_drive_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<DriveFile>, ApiError> {
    Ok(Json(state.drive.get_file(&file_id).await?))
}

/// POST /api/movie-sources/drive/import
pub async fn import_from_drive(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<DriveImportRequest>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    request.validate()?;
    let movie = state
        .catalog_service()
        .import_from_drive(&request, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// POST /api/movie-sources/drive/auth
pub async fn set_drive_auth(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<DriveAuthRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request.validate()?;
    state.drive.set_refresh_token(&request.refresh_token).await;
    info!(updated_by = %user.id, "Drive credentials replaced");
    Ok(Json(MessageResponse::new("Google Drive authorized")))
}
