//! The signed-in user's notification inbox.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::common::MessageResponse;
use domain::models::notification::{
    CreateNotificationRequest, NewNotification, Notification, NotificationView,
};
use persistence::repositories::{NotificationRepository, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Loads a notification and checks the caller owns it.
async fn owned(
    repo: &NotificationRepository,
    id: Uuid,
    user: &CurrentUser,
) -> Result<Notification, ApiError> {
    let notification: Notification = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?
        .into();
    if notification.user_id != user.id {
        return Err(ApiError::Forbidden("Not your notification".to_string()));
    }
    Ok(notification)
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let rows = NotificationRepository::new(state.pool.clone())
        .list_for_user(user.id)
        .await?;
    Ok(Json(rows.into_iter().map(NotificationView::from).collect()))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let updated = NotificationRepository::new(state.pool.clone())
        .mark_all_read(user.id)
        .await?;
    tracing::debug!(user_id = %user.id, updated, "Notifications marked read");
    Ok(Json(MessageResponse::new("All notifications marked as read")))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let repo = NotificationRepository::new(state.pool.clone());
    owned(&repo, id, &user).await?;

    let updated = repo
        .mark_read(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    Ok(Json(updated.into()))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = NotificationRepository::new(state.pool.clone());
    owned(&repo, id, &user).await?;

    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }
    Ok(Json(MessageResponse::new("Notification deleted")))
}

/// DELETE /api/notifications
pub async fn delete_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = NotificationRepository::new(state.pool.clone())
        .delete_all(user.id)
        .await?;
    info!(user_id = %user.id, removed, "Notifications cleared");
    Ok(Json(MessageResponse::new("All notifications deleted")))
}

/// POST /api/notifications (mod)
pub async fn create_notification(
    State(state): State<AppState>,
    sender: CurrentUser,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    request.validate()?;

    UserRepository::new(state.pool.clone())
        .find_by_id(request.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let new_notification: NewNotification = request.into();
    let created: Notification = NotificationRepository::new(state.pool.clone())
        .create(&new_notification)
        .await?
        .into();

    info!(
        notification_id = %created.id,
        recipient = %created.user_id,
        kind = %created.kind,
        sender = %sender.id,
        "Notification sent"
    );
    Ok((StatusCode::CREATED, Json(created)))
}
