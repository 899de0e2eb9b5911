use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::{ApiError, AppState, CriticTag, LikesDto, MessageDto, ReviewDto, UserSummaryDto};
use crate::api::validation::{
    validate_movie_ref, validate_rating, validate_review_text, validate_sub_score,
};
use crate::auth::{AdminOverride, Identity, Role};
use crate::db::Store;
use crate::db::repositories::review::CriticDetailsUpdate;
use crate::entities::reviews;

const RECENT_REVIEW_LIMIT: u64 = 10;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub movie_id: String,
    pub movie_title: String,
    #[serde(default)]
    pub movie_poster: Option<String>,
    pub rating: i32,
    pub review_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub review_text: String,
}

#[derive(Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct FeatureRequest {
    pub featured: bool,
}

#[derive(Deserialize)]
pub struct CriticDetailsRequest {
    pub screenplay: Option<i32>,
    pub acting: Option<i32>,
    pub cinematography: Option<i32>,
    pub soundtrack: Option<i32>,
    pub directing: Option<i32>,
}

/// Attach author embeds and like counts to raw review rows. Two batch
/// queries total, regardless of list length.
pub(crate) async fn hydrate_reviews(
    store: &Store,
    rows: Vec<reviews::Model>,
) -> Result<Vec<ReviewDto>, ApiError> {
    let mut user_ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let users = store.get_users_by_ids(&user_ids).await?;
    let authors: HashMap<i32, UserSummaryDto> = users
        .iter()
        .map(|u| (u.id, UserSummaryDto::from(u)))
        .collect();

    let review_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let likes = store.review_like_counts(&review_ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let author = authors.get(&row.user_id).cloned()?;
            let count = likes.get(&row.id).copied().unwrap_or(0);
            Some(ReviewDto::from_parts(row, author, count))
        })
        .collect())
}

async fn hydrate_one(store: &Store, row: reviews::Model) -> Result<ReviewDto, ApiError> {
    let author = store
        .get_user(row.user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    let likes = store.review_like_count(row.id).await?;
    Ok(ReviewDto::from_parts(row, UserSummaryDto::from(&author), likes))
}

async fn load_review(store: &Store, id: i32) -> Result<reviews::Model, ApiError> {
    store
        .get_review(id)
        .await?
        .ok_or_else(ApiError::review_not_found)
}

/// POST /reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewDto>), ApiError> {
    validate_movie_ref(&payload.movie_id, &payload.movie_title)?;
    validate_rating(payload.rating)?;
    let text = validate_review_text(&payload.review_text)?;

    // Critic reviews are featured at creation; a role-driven default, not a
    // separate step.
    let is_featured = identity.role == Role::Critic;

    let review = state
        .store()
        .create_review(
            identity.id,
            payload.movie_id.trim(),
            payload.movie_title.trim(),
            payload.movie_poster.as_deref(),
            payload.rating,
            text,
            is_featured,
        )
        .await?;

    let dto = hydrate_one(state.store(), review).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// GET /reviews/movie/:movie_id
pub async fn reviews_for_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    let rows = state.store().reviews_for_movie(&movie_id).await?;
    Ok(Json(hydrate_reviews(state.store(), rows).await?))
}

/// GET /reviews/recent
pub async fn recent_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    let rows = state.store().recent_reviews(RECENT_REVIEW_LIMIT).await?;
    Ok(Json(hydrate_reviews(state.store(), rows).await?))
}

/// GET /reviews/featured
pub async fn featured_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    let rows = state.store().featured_reviews().await?;
    Ok(Json(hydrate_reviews(state.store(), rows).await?))
}

/// PUT /reviews/:id — owner or admin
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    identity.require_owner(review.user_id, AdminOverride::Allowed)?;

    validate_rating(payload.rating)?;
    let text = validate_review_text(&payload.review_text)?;

    let updated = state
        .store()
        .update_review(id, payload.rating, text)
        .await?
        .ok_or_else(ApiError::review_not_found)?;
    let dto = hydrate_one(state.store(), updated).await?;
    Ok(Json(dto))
}

/// DELETE /reviews/:id — owner or admin
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
) -> Result<Json<MessageDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    identity.require_owner(review.user_id, AdminOverride::Allowed)?;

    state.store().delete_review(id).await?;
    Ok(Json(MessageDto::new("Review deleted")))
}

/// POST /reviews/:id/like — toggles membership in the like set
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
) -> Result<Json<LikesDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    let likes = state
        .store()
        .toggle_review_like(review.id, identity.id)
        .await?;
    Ok(Json(LikesDto { likes }))
}

/// DELETE /reviews/:id/like — unconditional removal, no-op when not liked
pub async fn remove_like(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
) -> Result<Json<LikesDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    let likes = state
        .store()
        .remove_review_like(review.id, identity.id)
        .await?;
    Ok(Json(LikesDto { likes }))
}

/// Critic annotation endpoints require the critic (or admin) role AND strict
/// ownership: only the critic who wrote the review may annotate it, with no
/// admin bypass.
fn require_critic_owner(identity: Identity, review: &reviews::Model) -> Result<(), ApiError> {
    identity.require_role(&[Role::Critic, Role::Admin])?;
    identity.require_owner(review.user_id, AdminOverride::Denied)
}

/// POST /reviews/:id/tags
pub async fn set_tags(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<TagsRequest>,
) -> Result<Json<ReviewDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    require_critic_owner(identity, &review)?;

    let tags: Vec<CriticTag> = payload
        .tags
        .iter()
        .map(|raw| CriticTag::from_str(raw))
        .collect::<Result<_, _>>()?;
    let tags_json = serde_json::to_string(&tags)
        .map_err(|e| ApiError::internal(format!("Failed to encode tags: {e}")))?;

    let updated = state
        .store()
        .set_review_tags(id, &tags_json)
        .await?
        .ok_or_else(ApiError::review_not_found)?;
    let dto = hydrate_one(state.store(), updated).await?;
    Ok(Json(dto))
}

/// PUT /reviews/:id/feature
pub async fn set_featured(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<FeatureRequest>,
) -> Result<Json<ReviewDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    require_critic_owner(identity, &review)?;

    let updated = state
        .store()
        .set_review_featured(id, payload.featured)
        .await?
        .ok_or_else(ApiError::review_not_found)?;
    let dto = hydrate_one(state.store(), updated).await?;
    Ok(Json(dto))
}

/// POST /reviews/:id/critic-details — field-wise merge of the five
/// sub-scores; omitted fields keep their stored value.
pub async fn merge_critic_details(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<CriticDetailsRequest>,
) -> Result<Json<ReviewDto>, ApiError> {
    let review = load_review(state.store(), id).await?;
    require_critic_owner(identity, &review)?;

    for (name, score) in [
        ("screenplay", payload.screenplay),
        ("acting", payload.acting),
        ("cinematography", payload.cinematography),
        ("soundtrack", payload.soundtrack),
        ("directing", payload.directing),
    ] {
        if let Some(score) = score {
            validate_sub_score(name, score)?;
        }
    }

    let update = CriticDetailsUpdate {
        screenplay: payload.screenplay,
        acting: payload.acting,
        cinematography: payload.cinematography,
        soundtrack: payload.soundtrack,
        directing: payload.directing,
    };

    let updated = state
        .store()
        .merge_critic_details(id, update)
        .await?
        .ok_or_else(ApiError::review_not_found)?;
    let dto = hydrate_one(state.store(), updated).await?;
    Ok(Json(dto))
}
