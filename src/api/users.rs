use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use super::{
    ApiError, AppState, ReviewDto, StatsDto, UserDto, UserProfileDto, UserSummaryDto,
};
use crate::api::reviews::hydrate_reviews;
use crate::auth::{AdminOverride, Identity, MaybeIdentity, Role};
use crate::db::{ProfileUpdate, Store};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub favorite_genres: Option<Vec<String>>,
    pub is_private: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

async fn load_user(store: &Store, id: i32) -> Result<crate::db::User, ApiError> {
    store
        .get_user(id)
        .await?
        .ok_or_else(ApiError::user_not_found)
}

/// GET /users — admin only
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    identity.require_role(&[Role::Admin])?;
    let users = state.store().list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// GET /users/:id — public profile with aggregate stats. When the caller is
/// authenticated, isFollowing reflects their follow edge to this user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<i32>,
) -> Result<Json<UserProfileDto>, ApiError> {
    let store = state.store();
    let user = load_user(store, id).await?;

    let stats = StatsDto {
        reviews: store.review_count_for_user(id).await?,
        followers: store.follower_count(id).await?,
        following: store.following_count(id).await?,
    };

    let is_following = match identity {
        Some(viewer) if viewer.id != id => store.is_following(viewer.id, id).await?,
        _ => false,
    };

    Ok(Json(UserProfileDto {
        user: UserDto::from(user),
        stats,
        is_following,
    }))
}

/// PUT /users/:id — owner or admin
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserDto>, ApiError> {
    identity.require_owner(id, AdminOverride::Allowed)?;

    let update = ProfileUpdate {
        bio: payload.bio,
        avatar: payload.avatar,
        favorite_genres: payload.favorite_genres,
        is_private: payload.is_private,
    };

    let user = state
        .store()
        .update_user_profile(id, update)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(UserDto::from(user)))
}

/// PUT /users/:id/role — admin only
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserDto>, ApiError> {
    identity.require_role(&[Role::Admin])?;

    let role = Role::from_str(&payload.role)?;

    let user = state
        .store()
        .update_user_role(id, role.as_str())
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    tracing::info!(user_id = id, role = role.as_str(), "Role updated");
    Ok(Json(UserDto::from(user)))
}

/// GET /users/:id/reviews
pub async fn user_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    let store = state.store();
    load_user(store, id).await?;
    let rows = store.reviews_for_user(id).await?;
    Ok(Json(hydrate_reviews(store, rows).await?))
}

/// GET /users/:id/followers
pub async fn user_followers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<UserSummaryDto>>, ApiError> {
    let store = state.store();
    load_user(store, id).await?;
    let ids = store.follower_ids(id).await?;
    let users = store.get_users_by_ids(&ids).await?;
    Ok(Json(users.iter().map(UserSummaryDto::from).collect()))
}

/// GET /users/:id/following
pub async fn user_following(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<UserSummaryDto>>, ApiError> {
    let store = state.store();
    load_user(store, id).await?;
    let ids = store.following_ids(id).await?;
    let users = store.get_users_by_ids(&ids).await?;
    Ok(Json(users.iter().map(UserSummaryDto::from).collect()))
}
