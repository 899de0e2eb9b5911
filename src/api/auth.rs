use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState, AuthResponse, MessageDto, UserDto};
use crate::api::validation::{validate_password, validate_username};
use crate::auth::{Identity, Role, SESSION_USER_ID, SESSION_USER_ROLE, issue_token};
use crate::db::User;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(SESSION_USER_ROLE, user.role.clone())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    Ok(())
}

fn bearer_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let identity = Identity {
        id: user.id,
        role: Role::from_str(&user.role).unwrap_or(Role::User),
    };
    issue_token(
        identity,
        &state.config().security.jwt_secret,
        state.config().security.token_ttl_minutes,
    )
}

/// POST /auth/register
/// Create an account, start a session, and hand back a bearer token for
/// cookie-less clients.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    let user = state
        .store()
        .create_user(username, &payload.password, Role::User.as_str())
        .await?;

    start_session(&session, &user).await?;
    let token = bearer_token(&state, &user)?;

    tracing::info!("New account registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserDto::from(user),
            token,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let is_valid = state
        .store()
        .verify_user_password(&payload.username, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store()
        .get_user_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    start_session(&session, &user).await?;
    let token = bearer_token(&state, &user)?;

    Ok(Json(AuthResponse {
        user: UserDto::from(user),
        token,
    }))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<MessageDto> {
    let _ = session.flush().await;
    Json(MessageDto::new("Logged out"))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .store()
        .get_user(identity.id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(UserDto::from(user)))
}
