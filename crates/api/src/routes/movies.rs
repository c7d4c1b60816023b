//! Public catalog browsing, staff CRUD and ratings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::common::{ilike_pattern, normalize_search, MessageResponse};
use domain::models::movie::{
    CreateMovieRequest, ListMoviesQuery, Movie, MovieListResponse, RateMovieRequest,
    RatingResponse, UpdateMovieRequest,
};
use domain::models::movie_source::{ApiImportRequest, ExternalListQuery};
use persistence::repositories::MovieRepository;
use serde_json::Value;
use shared::pagination::PageRequest;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_rating;

fn not_found() -> ApiError {
    ApiError::NotFound("Movie not found".to_string())
}

/// GET /api/movies
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let page = PageRequest::new(query.page, query.limit, state.config.catalog.movie_page_size)?;
    let genre = query.genre_filter();
    let pattern = normalize_search(query.search.as_deref()).map(ilike_pattern);

    let repo = MovieRepository::new(state.pool.clone());
    let movies = repo
        .list(
            genre,
            pattern.as_deref(),
            query.sort(),
            page.limit(),
            page.offset(),
        )
        .await?;
    let total = repo.count(genre, pattern.as_deref()).await?;

    Ok(Json(MovieListResponse {
        movies: movies.into_iter().map(Movie::from).collect(),
        current_page: page.page,
        total_pages: page.total_pages(total),
        total_movies: total,
    }))
}

/// GET /api/movies/:id
///
/// Every successful fetch counts as one view.
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Movie>, ApiError> {
    let movie = MovieRepository::new(state.pool.clone())
        .increment_views(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(movie.into()))
}

/// POST /api/movies (mod)
pub async fn create_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    request.validate()?;

    let movie: Movie = MovieRepository::new(state.pool.clone())
        .create(&request.into_new_movie(user.id))
        .await?
        .into();

    info!(movie_id = %movie.id, created_by = %user.id, "Movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// PUT /api/movies/:id (mod)
pub async fn update_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMovieRequest>,
) -> Result<Json<Movie>, ApiError> {
    request.validate()?;

    let movie = MovieRepository::new(state.pool.clone())
        .update(id, &request)
        .await?
        .ok_or_else(not_found)?;

    info!(movie_id = %id, updated_by = %user.id, "Movie updated");
    Ok(Json(movie.into()))
}

/// DELETE /api/movies/:id (admin)
pub async fn delete_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !MovieRepository::new(state.pool.clone()).delete(id).await? {
        return Err(not_found());
    }
    info!(movie_id = %id, deleted_by = %user.id, "Movie deleted");
    Ok(Json(MessageResponse::new("Movie deleted")))
}

/// POST /api/movies/:id/rate
pub async fn rate_movie(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RateMovieRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    request.validate()?;

    let updated = MovieRepository::new(state.pool.clone())
        .apply_rating(id, request.rating)
        .await?
        .ok_or_else(not_found)?;
    record_rating();

    tracing::debug!(movie_id = %id, user_id = %user.id, rating = request.rating, "Movie rated");
    Ok(Json(RatingResponse {
        rating: updated.rating,
        rating_count: updated.rating_count,
    }))
}

/// GET /api/movies/fetch/external (admin)
pub async fn fetch_external(
    State(state): State<AppState>,
    Query(query): Query<ExternalListQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = PageRequest::new(
        query.page,
        query.limit,
        state.config.catalog.external_page_size,
    )?;
    let payload = state.movie_api.list(page.page, page.limit).await?;
    Ok(Json(payload))
}

/// POST /api/movies/import/external (admin)
pub async fn import_external(
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
