//! Profile, favorites, watch history and account administration.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::common::MessageResponse;
use domain::models::movie::Movie;
use domain::models::user::{
    block_until_from, BlockUserRequest, FavoriteStatusResponse, Role, UpdateProfileRequest,
    UpdateRoleRequest, User, WatchHistoryEntry,
};
use domain::services::account_blocked;
use persistence::repositories::{
    LibraryRepository, MovieRepository, NotificationRepository, UserRepository,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

async fn ensure_movie_exists(state: &AppState, movie_id: Uuid) -> Result<(), ApiError> {
    MovieRepository::new(state.pool.clone())
        .find_by_id(movie_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))
}

async fn load_user(repo: &UserRepository, id: Uuid) -> Result<User, ApiError> {
    repo.find_by_id(id)
        .await?
        .map(User::from)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// GET /api/users (admin)
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = UserRepository::new(state.pool.clone()).list_all().await?;
    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    Ok(Json(load_user(&repo, user.id).await?))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;
    let updated = state.auth_service().update_profile(user.id, &request).await?;
    info!(user_id = %user.id, "Profile updated");
    Ok(Json(updated))
}

/// GET /api/users/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = LibraryRepository::new(state.pool.clone())
        .list_favorites(user.id)
        .await?;
    Ok(Json(movies.into_iter().map(Movie::from).collect()))
}

/// POST /api/users/favorites/:movie_id
pub async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_movie_exists(&state, movie_id).await?;

    let added = LibraryRepository::new(state.pool.clone())
        .add_favorite(user.id, movie_id)
        .await?;
    if !added {
        return Err(ApiError::Validation("Movie already in favorites".to_string()));
    }
    Ok(Json(MessageResponse::new("Movie added to favorites")))
}

/// DELETE /api/users/favorites/:movie_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = LibraryRepository::new(state.pool.clone())
        .remove_favorite(user.id, movie_id)
        .await?;
    if !removed {
        return Err(ApiError::NotFound("Movie is not in favorites".to_string()));
    }
    Ok(Json(MessageResponse::new("Movie removed from favorites")))
}

/// GET /api/users/check-favorite/:movie_id
pub async fn check_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<FavoriteStatusResponse>, ApiError> {
    let is_favorite = LibraryRepository::new(state.pool.clone())
        .is_favorite(user.id, movie_id)
        .await?;
    Ok(Json(FavoriteStatusResponse { is_favorite }))
}

/// GET /api/users/watch-history
pub async fn watch_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<WatchHistoryEntry>>, ApiError> {
    let entries = LibraryRepository::new(state.pool.clone())
        .list_watch_history(user.id)
        .await?;
    Ok(Json(entries.into_iter().map(WatchHistoryEntry::from).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecordedResponse {
    pub movie_id: Uuid,
    pub watched_at: DateTime<Utc>,
}

/// POST /api/users/watch-history/:movie_id
pub async fn record_watch(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<WatchRecordedResponse>, ApiError> {
    ensure_movie_exists(&state, movie_id).await?;
    let watched_at = LibraryRepository::new(state.pool.clone())
        .record_watch(user.id, movie_id)
        .await?;
    Ok(Json(WatchRecordedResponse {
        movie_id,
        watched_at,
    }))
}

/// DELETE /api/users/watch-history
pub async fn clear_watch_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = LibraryRepository::new(state.pool.clone())
        .clear_watch_history(user.id)
        .await?;
    info!(user_id = %user.id, removed, "Watch history cleared");
    Ok(Json(MessageResponse::new("Watch history cleared")))
}

/// PUT /api/users/:id/role (admin)
pub async fn update_role(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<User>, ApiError> {
    let role: Role = request
        .role
        .parse()
        .map_err(|_| ApiError::Validation("Invalid role".to_string()))?;
    if id == admin.id {
        return Err(ApiError::Validation("You cannot change your own role".to_string()));
    }

    let updated = UserRepository::new(state.pool.clone())
        .update_role(id, role.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %id, role = %role, changed_by = %admin.id, "User role changed");
    Ok(Json(updated.into()))
}

/// DELETE /api/users/:id (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == admin.id {
        return Err(ApiError::Validation("You cannot delete your own account".to_string()));
    }

    let deleted = UserRepository::new(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, deleted_by = %admin.id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Staff may only block accounts ranked below them.
pub fn can_block(caller: Role, target: Role) -> bool {
    !target.has_at_least(caller)
}

/// PUT /api/users/:id/block (mod)
pub async fn block_user(
    State(state): State<AppState>,
    moderator: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<BlockUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let target = load_user(&repo, id).await?;

    if id == moderator.id {
        return Err(ApiError::Validation("You cannot block your own account".to_string()));
    }
    if !can_block(moderator.role, target.role) {
        return Err(ApiError::Forbidden(
            "You cannot block a user with an equal or higher role".to_string(),
        ));
    }

    let block_until = if request.blocked {
        block_until_from(Utc::now(), request.duration)
    } else {
        None
    };

    let updated: User = repo
        .set_block(id, request.blocked, block_until)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    if request.blocked {
        let notification = account_blocked(id, block_until);
        if let Err(e) = NotificationRepository::new(state.pool.clone())
            .create(&notification)
            .await
        {
            warn!(user_id = %id, error = %e, "Failed to create block notification");
        }
    }

    info!(
        user_id = %id,
        blocked = request.blocked,
        block_until = ?block_until,
        moderator = %moderator.id,
        "User block state changed"
    );
    Ok(Json(updated))
}
