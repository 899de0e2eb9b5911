use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod follows;
mod movies;
mod reviews;
mod types;
mod users;
mod validation;
mod watchlist;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tmdb(&self) -> &Arc<crate::clients::tmdb::TmdbClient> {
        &self.shared.tmdb
    }
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(Arc::new(AppState { shared }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_ttl) = {
        let config = state.config();
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_ttl_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(session_ttl)));

    let api_router = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/movie/{movie_id}", get(reviews::reviews_for_movie))
        .route("/reviews/recent", get(reviews::recent_reviews))
        .route("/reviews/featured", get(reviews::featured_reviews))
        .route("/reviews/{id}", put(reviews::update_review))
        .route("/reviews/{id}", delete(reviews::delete_review))
        .route("/reviews/{id}/like", post(reviews::toggle_like))
        .route("/reviews/{id}/like", delete(reviews::remove_like))
        .route("/reviews/{id}/tags", post(reviews::set_tags))
        .route("/reviews/{id}/feature", put(reviews::set_featured))
        .route("/reviews/{id}/critic-details", post(reviews::merge_critic_details))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}/role", put(users::update_role))
        .route("/users/{id}/reviews", get(users::user_reviews))
        .route("/users/{id}/followers", get(users::user_followers))
        .route("/users/{id}/following", get(users::user_following))
        .route("/follows/{user_id}", post(follows::follow_user))
        .route("/follows/{user_id}", delete(follows::unfollow_user))
        .route("/follows/status/{user_id}", get(follows::follow_status))
        .route("/watchlist", get(watchlist::get_watchlist))
        .route("/watchlist/add", post(watchlist::add_movie))
        .route("/watchlist/remove/{movie_id}", delete(watchlist::remove_movie))
        .route("/watchlist/check/{movie_id}", get(watchlist::check_movie))
        .route("/movies/search", get(movies::search))
        .route("/movies/trending/popular", get(movies::trending_popular))
        .route("/movies/trending/week", get(movies::trending_week))
        .route("/movies/{id}", get(movies::movie_details))
        .layer(session_layer);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(health))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let status = if state.store().ping().await.is_ok() {
        "OK"
    } else {
        "DEGRADED"
    };
    Json(HealthDto {
        status,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
