//! Admin and moderator back-office dashboards.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use domain::models::comment::{CommentListItem, CommentListResponse};
use domain::models::common::{ilike_pattern, PageQuery};
use domain::models::dashboard::{AdminStats, ModCommentsQuery, ModStats, PENDING_COMMENT_WINDOW_HOURS};
use domain::models::movie::{Movie, MovieListResponse, MovieSort};
use domain::models::user::{UserListResponse, UserSummary};
use persistence::repositories::{
    CommentRepository, DashboardRepository, MovieRepository, UserRepository,
};
use shared::pagination::PageRequest;

use crate::app::AppState;
use crate::error::ApiError;

fn page_request(state: &AppState, page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, ApiError> {
    Ok(PageRequest::new(page, limit, state.config.catalog.admin_page_size)?)
}

async fn users_page(state: &AppState, query: &PageQuery) -> Result<UserListResponse, ApiError> {
    let page = page_request(state, query.page, query.limit)?;
    let pattern = query.search_term().map(ilike_pattern);

    let repo = UserRepository::new(state.pool.clone());
    let users = repo
        .list_page(pattern.as_deref(), page.limit(), page.offset())
        .await?;
    let total = repo.count(pattern.as_deref()).await?;

    Ok(UserListResponse {
        users: users.into_iter().map(UserSummary::from).collect(),
        current_page: page.page,
        total_pages: page.total_pages(total),
        total_users: total,
    })
}

async fn movies_page(state: &AppState, query: &PageQuery) -> Result<MovieListResponse, ApiError> {
    let page = page_request(state, query.page, query.limit)?;
    let pattern = query.search_term().map(ilike_pattern);

    let repo = MovieRepository::new(state.pool.clone());
    let movies = repo
        .list(
            None,
            pattern.as_deref(),
            MovieSort::Newest,
            page.limit(),
            page.offset(),
        )
        .await?;
    let total = repo.count(None, pattern.as_deref()).await?;

    Ok(MovieListResponse {
        movies: movies.into_iter().map(Movie::from).collect(),
        current_page: page.page,
        total_pages: page.total_pages(total),
        total_movies: total,
    })
}

async fn comments_page(
    state: &AppState,
    page: PageRequest,
    pattern: Option<&str>,
    since: Option<chrono::DateTime<Utc>>,
) -> Result<CommentListResponse, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());
    let comments = repo
        .list_page(pattern, since, page.limit(), page.offset())
        .await?;
    let total = repo.count(pattern, since).await?;

    Ok(CommentListResponse {
        comments: comments.into_iter().map(CommentListItem::from).collect(),
        current_page: page.page,
        total_pages: page.total_pages(total),
        total_comments: total,
    })
}

/// GET /api/admin/stats
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    let stats = DashboardRepository::new(state.pool.clone())
        .admin_stats()
        .await?;
    Ok(Json(stats))
}

/// GET /api/admin/users
pub async fn admin_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    Ok(Json(users_page(&state, &query).await?))
}

/// GET /api/admin/movies
pub async fn admin_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieListResponse>, ApiError> {
    Ok(Json(movies_page(&state, &query).await?))
}

/// GET /api/admin/comments
pub async fn admin_comments(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let page = page_request(&state, query.page, query.limit)?;
    let pattern = query.search_term().map(ilike_pattern);
    Ok(Json(
        comments_page(&state, page, pattern.as_deref(), None).await?,
    ))
}

/// GET /api/mod/stats
pub async fn mod_stats(State(state): State<AppState>) -> Result<Json<ModStats>, ApiError> {
    let stats = DashboardRepository::new(state.pool.clone())
        .mod_stats()
        .await?;
    Ok(Json(stats))
}

/// GET /api/mod/movies
pub async fn mod_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieListResponse>, ApiError> {
    Ok(Json(movies_page(&state, &query).await?))
}

/// GET /api/mod/comments
///
/// `recent=true` limits the list to the pending window.
pub async fn mod_comments(
    State(state): State<AppState>,
    Query(query): Query<ModCommentsQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let page = page_request(&state, query.page, query.limit)?;
    let since = query
        .recent
        .then(|| Utc::now() - Duration::hours(PENDING_COMMENT_WINDOW_HOURS));
    Ok(Json(comments_page(&state, page, None, since).await?))
}

/// GET /api/mod/users
pub async fn mod_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    Ok(Json(users_page(&state, &query).await?))
}
