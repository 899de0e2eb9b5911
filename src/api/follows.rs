use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{ApiError, AppState, FollowStatusDto, MessageDto};
use crate::auth::Identity;

/// POST /follows/:user_id
pub async fn follow_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(user_id): Path<i32>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    if user_id == identity.id {
        return Err(ApiError::validation("Cannot follow yourself"));
    }

    let store = state.store();
    store
        .get_user(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    store.add_follow(identity.id, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageDto::new("Successfully followed user")),
    ))
}

/// DELETE /follows/:user_id
pub async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(user_id): Path<i32>,
) -> Result<Json<MessageDto>, ApiError> {
    let removed = state.store().remove_follow(identity.id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Not following this user".to_string()));
    }
    Ok(Json(MessageDto::new("Successfully unfollowed user")))
}

/// GET /follows/status/:user_id
pub async fn follow_status(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(user_id): Path<i32>,
) -> Result<Json<FollowStatusDto>, ApiError> {
    let is_following = state.store().is_following(identity.id, user_id).await?;
    Ok(Json(FollowStatusDto { is_following }))
}
