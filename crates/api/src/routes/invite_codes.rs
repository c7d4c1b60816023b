//! Invite code lifecycle and the public validity check.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::models::common::{ilike_pattern, MessageResponse, PageQuery};
use domain::models::invite_code::{
    expiry_from, CreateInviteCodeRequest, InviteCode, InviteCodeDetails, InviteCodeListResponse,
    InviteRejection, InviteUser, InviteValidationResponse,
};
use persistence::entities::InviteCodeWithCreatorEntity;
use persistence::repositories::{is_unique_violation, InviteCodeRepository};
use shared::crypto::generate_invite_code;
use shared::pagination::PageRequest;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Attempts before giving up on a fresh random code.
const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Attaches the registered users to each code, preserving order.
async fn with_users(
    repo: &InviteCodeRepository,
    rows: Vec<InviteCodeWithCreatorEntity>,
) -> Result<Vec<InviteCodeDetails>, ApiError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.invite_code.id).collect();
    let mut users_by_code: HashMap<Uuid, Vec<InviteUser>> = HashMap::new();
    for row in repo.users_for_codes(&ids).await? {
        users_by_code
            .entry(row.invite_code_id)
            .or_default()
            .push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let creator = row.creator();
            let id = row.invite_code.id;
            InviteCodeDetails {
                invite_code: row.invite_code.into(),
                creator,
                used_by: users_by_code.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

/// GET /api/invite-codes (admin)
pub async fn list_invite_codes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<InviteCodeListResponse>, ApiError> {
    let page = PageRequest::new(query.page, query.limit, state.config.catalog.admin_page_size)?;
    let pattern = query.search_term().map(ilike_pattern);

    let repo = InviteCodeRepository::new(state.pool.clone());
    let rows = repo
        .list_page(pattern.as_deref(), page.limit(), page.offset())
        .await?;
    let total = repo.count(pattern.as_deref()).await?;

    Ok(Json(InviteCodeListResponse {
        invite_codes: with_users(&repo, rows).await?,
        current_page: page.page,
        total_pages: page.total_pages(total),
        total_invite_codes: total,
    }))
}

/// GET /api/invite-codes/my-codes (mod)
pub async fn my_invite_codes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<InviteCodeDetails>>, ApiError> {
    let repo = InviteCodeRepository::new(state.pool.clone());
    let rows = repo.list_by_creator(user.id).await?;
    Ok(Json(with_users(&repo, rows).await?))
}

/// POST /api/invite-codes (mod)
pub async fn create_invite_code(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateInviteCodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InviteCode>), ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let repo = InviteCodeRepository::new(state.pool.clone());
    let expires_at = expiry_from(Utc::now(), request.expires_in_days);

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let code = generate_invite_code();
        match repo
            .create(&code, user.id, expires_at, request.max_uses)
            .await
        {
            Ok(created) => {
                info!(
                    invite_code_id = %created.id,
                    created_by = %user.id,
                    max_uses = request.max_uses,
                    "Invite code created"
                );
                return Ok((StatusCode::CREATED, Json(created.into())));
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(attempt, "Invite code collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::Internal(
        "Could not generate a unique invite code".to_string(),
    ))
}

/// GET /api/invite-codes/:id (mod)
pub async fn get_invite_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InviteCodeDetails>, ApiError> {
    let repo = InviteCodeRepository::new(state.pool.clone());
    let row = repo
        .find_with_creator(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite code not found".to_string()))?;

    let mut details = with_users(&repo, vec![row]).await?;
    details
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Invite code not found".to_string()))
}

/// DELETE /api/invite-codes/:id (admin)
pub async fn delete_invite_code(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = InviteCodeRepository::new(state.pool.clone())
        .delete(id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Invite code not found".to_string()));
    }
    info!(invite_code_id = %id, deleted_by = %admin.id, "Invite code deleted");
    Ok(Json(MessageResponse::new("Invite code deleted")))
}

/// Status for a validity check outcome.
fn validation_status(result: &Result<(), InviteRejection>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::OK,
        Err(InviteRejection::Invalid) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::BAD_REQUEST,
    }
}

/// GET /api/invite-codes/validate/:code (public)
///
/// Read-only: a code is only consumed when a registration commits.
pub async fn validate_invite_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let found = InviteCodeRepository::new(state.pool.clone())
        .find_by_code(code.trim())
        .await?
        .map(InviteCode::from);

    let result = match &found {
        Some(invite) => invite.check(Utc::now()),
        None => Err(InviteRejection::Invalid),
    };
    let status = validation_status(&result);
    let body = match (result, found) {
        (Ok(()), Some(invite)) => InviteValidationResponse::accepted(invite.expires_at),
        (Err(reason), _) => InviteValidationResponse::rejected(reason),
        (Ok(()), None) => InviteValidationResponse::rejected(InviteRejection::Invalid),
    };

    Ok((status, Json(body)).into_response())
}
