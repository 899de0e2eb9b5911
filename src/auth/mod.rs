//! Per-request identity resolution and the role/ownership gates applied
//! before every mutator.
//!
//! Two credential paths authenticate a request: a cookie session created at
//! login, and an `Authorization: Bearer` JWT. The session wins when both are
//! present. Both paths were kept for client compatibility; if both are ever
//! simultaneously valid but stale in different ways, the session still wins.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tower_sessions::Session;

use crate::api::{ApiError, AppState};

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_USER_ROLE: &str = "user_role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Critic,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Critic => "critic",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "critic" => Ok(Self::Critic),
            "admin" => Ok(Self::Admin),
            other => Err(ApiError::validation(format!("Unknown role: {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an ownership check admits the `admin` role as a bypass.
/// Critic annotation endpoints are strict owner-only and pass `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOverride {
    Allowed,
    Denied,
}

/// Resolved caller for the duration of one request. Never cached beyond it.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub id: i32,
    pub role: Role,
}

impl Identity {
    /// Role gate: succeeds iff the caller's role is in `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access denied. Insufficient permissions.".to_string(),
            ))
        }
    }

    /// Ownership gate: succeeds iff the caller owns the resource, or holds
    /// the admin elevation when `elevation` allows it.
    pub fn require_owner(
        &self,
        owner_id: i32,
        elevation: AdminOverride,
    ) -> Result<(), ApiError> {
        if self.id == owner_id {
            return Ok(());
        }
        if elevation == AdminOverride::Allowed && self.role == Role::Admin {
            return Ok(());
        }
        Err(ApiError::Forbidden("Unauthorized".to_string()))
    }
}

/// JWT claims carried by the bearer credential path.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issue a signed bearer token for `identity`, valid for `ttl_minutes`.
pub fn issue_token(identity: Identity, secret: &str, ttl_minutes: i64) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: identity.id.to_string(),
        role: identity.role.as_str().to_string(),
        exp: (now + chrono::Duration::minutes(ttl_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
}

/// Verify a bearer token's signature and expiry, returning the identity it
/// carries. Any failure collapses to a 401.
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Token is invalid".to_string()))?;

    let id: i32 = data
        .claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("Token is invalid".to_string()))?;
    let role = Role::from_str(&data.claims.role)
        .map_err(|_| ApiError::Unauthorized("Token is invalid".to_string()))?;

    Ok(Identity { id, role })
}

async fn resolve_identity(
    parts: &mut Parts,
    state: &Arc<AppState>,
) -> Result<Option<Identity>, ApiError> {
    // Session first (fastest path for the web client)
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::internal(format!("Session error: {msg}")))?;

    if let Ok(Some(id)) = session.get::<i32>(SESSION_USER_ID).await {
        let role = session
            .get::<String>(SESSION_USER_ROLE)
            .await
            .ok()
            .flatten()
            .and_then(|r| Role::from_str(&r).ok())
            .unwrap_or(Role::User);
        return Ok(Some(Identity { id, role }));
    }

    // Bearer JWT fallback
    let Some(token) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
    else {
        return Ok(None);
    };

    let secret = state.config().security.jwt_secret.clone();
    verify_token(token, &secret).map(Some)
}

impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_identity(parts, state).await?.ok_or_else(|| {
            ApiError::Unauthorized("No authentication token, access denied".to_string())
        })
    }
}

/// Optional identity for public endpoints that personalize output when the
/// caller happens to be logged in. A stale credential degrades to anonymous
/// instead of failing the request.
pub struct MaybeIdentity(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for MaybeIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_identity(parts, state).await.unwrap_or(None)))
    }
}
