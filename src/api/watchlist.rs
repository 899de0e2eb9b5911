use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, InWatchlistDto, WatchlistDto, WatchlistMovieDto};
use crate::api::validation::validate_movie_ref;
use crate::auth::Identity;
use crate::db::Store;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRequest {
    pub movie_id: String,
    pub movie_title: String,
    #[serde(default)]
    pub movie_poster: Option<String>,
}

async fn load_watchlist(store: &Store, user_id: i32) -> Result<WatchlistDto, ApiError> {
    let items = store.watchlist_for_user(user_id).await?;
    Ok(WatchlistDto {
        movies: items.into_iter().map(WatchlistMovieDto::from).collect(),
    })
}

/// GET /watchlist
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<WatchlistDto>, ApiError> {
    Ok(Json(load_watchlist(state.store(), identity.id).await?))
}

/// POST /watchlist/add
pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(payload): Json<AddMovieRequest>,
) -> Result<(StatusCode, Json<WatchlistDto>), ApiError> {
    validate_movie_ref(&payload.movie_id, &payload.movie_title)?;

    let store = state.store();
    store
        .add_to_watchlist(
            identity.id,
            payload.movie_id.trim(),
            payload.movie_title.trim(),
            payload.movie_poster.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(load_watchlist(store, identity.id).await?),
    ))
}

/// DELETE /watchlist/remove/:movie_id — no-op when the movie is absent
pub async fn remove_movie(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(movie_id): Path<String>,
) -> Result<Json<WatchlistDto>, ApiError> {
    let store = state.store();
    store.remove_from_watchlist(identity.id, &movie_id).await?;
    Ok(Json(load_watchlist(store, identity.id).await?))
}

/// GET /watchlist/check/:movie_id
pub async fn check_movie(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(movie_id): Path<String>,
) -> Result<Json<InWatchlistDto>, ApiError> {
    let in_watchlist = state.store().watchlist_contains(identity.id, &movie_id).await?;
    Ok(Json(InWatchlistDto { in_watchlist }))
}
