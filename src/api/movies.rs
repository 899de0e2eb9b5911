use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// GET /movies/search?query=...&page=N
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation("Query parameter is required"))?;
    let page = params.page.unwrap_or(1);

    let body = state
        .tmdb()
        .search_movies(query, page)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;
    Ok(Json(body))
}

/// GET /movies/trending/popular
pub async fn trending_popular(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb()
        .popular_movies()
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;
    Ok(Json(results_of(body)))
}

/// GET /movies/trending/week
pub async fn trending_week(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb()
        .trending_this_week()
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;
    Ok(Json(results_of(body)))
}

/// GET /movies/:id
pub async fn movie_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .tmdb()
        .movie_details(&id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Movie", &id))?;
    Ok(Json(body))
}

/// Paged catalog responses carry the page under "results"; the listing
/// endpoints expose just that array.
fn results_of(mut body: Value) -> Value {
    body.get_mut("results")
        .map(Value::take)
        .unwrap_or_else(|| Value::Array(Vec::new()))
}
