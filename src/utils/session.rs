// src/utils/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{profile::Profile, user::Role},
    state::AppState,
    utils::cookie,
};

pub const SESSION_COOKIE: &str = "session";

/// Session token claims.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// User's role (e.g., 'faculty', 'college').
    pub role: Role,
    /// Id of the backing row in 'sessions'.
    pub sid: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// The authenticated caller of the current request.
///
/// Resolved once by [`auth_middleware`] and handed to handlers through
/// request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    /// Id of the caller's row in its role's profile table.
    pub profile_id: i64,
    pub session_id: String,
}

/// Signs a session token for the user.
pub fn sign_session(
    user_id: i64,
    role: Role,
    session_id: &str,
    secret: &str,
    ttl_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + ttl_seconds as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        sid: session_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a session token.
pub fn verify_session(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;

    Ok(token_data.claims)
}

/// Records a new server-side session and returns its signed token.
/// Sessions that have already expired are pruned on the way.
pub async fn start_session(state: &AppState, user_id: i64, role: Role) -> Result<String, AppError> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(state.config.session_ttl as i64);

    let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(now)
        .execute(&state.pool)
        .await?
        .rows_affected();
    if pruned > 0 {
        tracing::debug!("Pruned {} expired sessions", pruned);
    }

    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&state.pool)
        .await?;

    sign_session(
        user_id,
        role,
        &session_id,
        &state.config.session_secret,
        state.config.session_ttl,
    )
}

/// Invalidates a session. Tokens naming it stop working immediately.
pub async fn end_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&state.pool)
        .await?;
    Ok(())
}

/// The `session` cookie carrying a freshly signed token.
pub fn session_cookie(token: String, ttl_seconds: u64) -> Cookie<'static> {
    cookie::site_cookie(
        SESSION_COOKIE,
        token,
        Some(time::Duration::seconds(ttl_seconds as i64)),
    )
}

/// Session token from the `session` cookie, or a `Bearer` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(found) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
        return Some(found.value().to_owned());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Axum Middleware: Authentication.
///
/// Validates the session token and its backing row, then injects the
/// caller's [`Identity`] into the request extensions. Requests without a
/// live session are sent to the login page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers()).ok_or(AppError::Unauthenticated)?;
    let claims = verify_session(&token, &state.config.session_secret)?;

    let session = sqlx::query_as::<_, (i64, Role, DateTime<Utc>)>(
        r#"
        SELECT s.user_id, u.role, s.expires_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = ?
        "#,
    )
    .bind(&claims.sid)
    .fetch_optional(&state.pool)
    .await?;

    let Some((user_id, role, expires_at)) = session else {
        return Err(AppError::Unauthenticated);
    };

    if expires_at < Utc::now() {
        end_session(&state, &claims.sid).await?;
        return Err(AppError::Unauthenticated);
    }

    if claims.sub != user_id.to_string() || claims.role != role {
        tracing::warn!("Session {} does not match its token claims", claims.sid);
        return Err(AppError::Unauthenticated);
    }

    let profile_id = Profile::id_for(&state.pool, role, user_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError(format!("user {user_id} has no {role} profile")))?;

    req.extensions_mut().insert(Identity {
        user_id,
        role,
        profile_id,
        session_id: claims.sid,
    });

    Ok(next.run(req).await)
}
