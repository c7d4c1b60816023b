//! Movie comment threads and likes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::comment::{
    assemble_threads, Comment, CommentListItem, CommentThread, CommentView, CreateCommentRequest,
    LikesResponse, UpdateCommentRequest,
};
use domain::models::common::MessageResponse;
use domain::services::comment_reply;
use persistence::entities::CommentWithAuthorEntity;
use persistence::repositories::{CommentRepository, MovieRepository, NotificationRepository};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

fn not_found() -> ApiError {
    ApiError::NotFound("Comment not found".to_string())
}

async fn load_comment(repo: &CommentRepository, id: Uuid) -> Result<Comment, ApiError> {
    repo.find_by_id(id)
        .await?
        .map(Comment::from)
        .ok_or_else(not_found)
}

/// Resolves likes for a batch of rows in one query.
async fn into_views(
    repo: &CommentRepository,
    rows: Vec<CommentWithAuthorEntity>,
) -> Result<Vec<CommentView>, ApiError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.comment.id).collect();
    let mut likes: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for like in repo.likes_for_comments(&ids).await? {
        likes.entry(like.comment_id).or_default().push(like.user_id);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.comment.id;
            row.into_view(likes.remove(&id).unwrap_or_default())
        })
        .collect())
}

/// GET /api/comments/movie/:movie_id
pub async fn list_for_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<Vec<CommentThread>>, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());

    let top_level = repo.top_level_for_movie(movie_id).await?;
    let parent_ids: Vec<Uuid> = top_level.iter().map(|r| r.comment.id).collect();
    let replies = repo.replies_for_parents(&parent_ids).await?;

    let top_level = into_views(&repo, top_level).await?;
    let replies = into_views(&repo, replies).await?;
    Ok(Json(assemble_threads(top_level, replies)))
}

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    request.validate()?;

    MovieRepository::new(state.pool.clone())
        .find_by_id(request.movie_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    let repo = CommentRepository::new(state.pool.clone());

    let parent = match request.parent_comment_id {
        Some(parent_id) => {
            let parent = repo
                .find_by_id(parent_id)
                .await?
                .map(Comment::from)
                .ok_or_else(|| ApiError::NotFound("Parent comment not found".to_string()))?;
            parent
                .check_reply_target(request.movie_id)
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            Some(parent)
        }
        None => None,
    };

    let created = repo
        .create(
            request.movie_id,
            user.id,
            parent.as_ref().map(|p| p.id),
            request.content.trim(),
        )
        .await?;

    if let Some(notification) = parent
        .as_ref()
        .and_then(|p| comment_reply(p.user_id, user.id, request.movie_id, created.id))
    {
        if let Err(e) = NotificationRepository::new(state.pool.clone())
            .create(&notification)
            .await
        {
            warn!(comment_id = %created.id, error = %e, "Failed to create reply notification");
        }
    }

    let view = repo
        .find_with_author(created.id)
        .await?
        .ok_or_else(not_found)?
        .into_view(Vec::new());

    info!(
        comment_id = %view.id,
        movie_id = %view.movie_id,
        user_id = %user.id,
        reply = view.parent_id.is_some(),
        "Comment created"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    request.validate()?;

    let repo = CommentRepository::new(state.pool.clone());
    let comment = load_comment(&repo, id).await?;
    if !comment.can_edit(user.id) {
        return Err(ApiError::Forbidden(
            "You can only edit your own comments".to_string(),
        ));
    }

    repo.update_content(id, request.content.trim())
        .await?
        .ok_or_else(not_found)?;

    let row = repo.find_with_author(id).await?.ok_or_else(not_found)?;
    let likes = repo.likes(id).await?;
    Ok(Json(row.into_view(likes)))
}

/// DELETE /api/comments/:id
///
/// Removing a top-level comment removes its replies too.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());
    let comment = load_comment(&repo, id).await?;
    if !comment.can_delete(user.id, user.role) {
        return Err(ApiError::Forbidden(
            "You can only delete your own comments".to_string(),
        ));
    }

    let removed = repo.delete_cascade(id).await?;
    if removed == 0 {
        return Err(not_found());
    }

    info!(comment_id = %id, deleted_by = %user.id, removed, "Comment deleted");
    Ok(Json(MessageResponse::new("Comment deleted")))
}

/// POST /api/comments/:id/like
pub async fn like_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LikesResponse>, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());
    load_comment(&repo, id).await?;

    if !repo.like(id, user.id).await? {
        return Err(ApiError::Validation(
            "You have already liked this comment".to_string(),
        ));
    }
    Ok(Json(LikesResponse {
        likes: repo.likes(id).await?,
    }))
}

/// POST /api/comments/:id/unlike
pub async fn unlike_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LikesResponse>, ApiError> {
    let repo = CommentRepository::new(state.pool.clone());
    load_comment(&repo, id).await?;

    repo.unlike(id, user.id).await?;
    Ok(Json(LikesResponse {
        likes: repo.likes(id).await?,
    }))
}

/// GET /api/comments/user/:user_id (mod)
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CommentListItem>>, ApiError> {
    let rows = CommentRepository::new(state.pool.clone())
        .list_by_user(user_id)
        .await?;
    Ok(Json(rows.into_iter().map(CommentListItem::from).collect()))
}
