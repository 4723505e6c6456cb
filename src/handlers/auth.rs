// src/handlers/auth.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        profile::Profile,
        user::{LoginRequest, RegisterRequest, Role, User},
    },
    state::AppState,
    utils::{
        cookie,
        flash::{Flash, IncomingFlash, Page},
        form::ValidForm,
        hash::{hash_password, verify_password},
        session::{Identity, SESSION_COOKIE, end_session, session_cookie, start_session},
    },
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register_form(flash: IncomingFlash) -> impl IntoResponse {
    Page::new(
        flash,
        json!({
            "form": "register",
            "fields": ["email", "password", "role"],
            "roles": Role::ALL,
        }),
    )
}

/// Registers a new user together with an empty profile for its role.
///
/// Both rows are written in one transaction. An email can only be
/// registered once, whatever role is declared.
pub async fn register(
    State(pool): State<SqlitePool>,
    ValidForm(payload): ValidForm<RegisterRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&payload.email);
    let hashed_password = hash_password(&payload.password)?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        return Err(AppError::invalid("Email already registered!", "/register"));
    }

    let user_id = sqlx::query(
        "INSERT INTO users (email, password_hash, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(payload.role)
    .bind(chrono::Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        // Lost a race with a concurrent registration of the same email.
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            AppError::invalid("Email already registered!", "/register")
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?
    .last_insert_rowid();

    Profile::create_empty(&mut *tx, payload.role, user_id).await?;

    tx.commit().await?;

    tracing::info!("Registered {} account {}", payload.role, user_id);

    Ok(Flash::success("Registration successful! Please login.").redirect("/login"))
}

pub async fn login_form(flash: IncomingFlash) -> impl IntoResponse {
    Page::new(
        flash,
        json!({
            "form": "login",
            "fields": ["email", "password", "role"],
            "roles": Role::ALL,
        }),
    )
}

/// Authenticates a user under the declared role and opens a session.
///
/// The account is looked up by (email, role), so a correct password with
/// the wrong role fails just like a wrong password.
pub async fn login(
    State(state): State<AppState>,
    ValidForm(payload): ValidForm<LoginRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&payload.email);

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password_hash, role, created_at
        FROM users
        WHERE email = ? AND role = ?
        "#,
    )
    .bind(&email)
    .bind(payload.role)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = match user {
        Some(user) if verify_password(&payload.password, &user.password_hash)? => user,
        _ => {
            tracing::info!("Failed {} login for {}", payload.role, email);
            return Err(AppError::invalid("Invalid credentials!", "/login"));
        }
    };

    let token = start_session(&state, user.id, user.role).await?;
    let flash = Flash::success("Login successful!");

    let jar = CookieJar::new()
        .add(session_cookie(token, state.config.session_ttl))
        .add(flash.to_cookie());

    Ok((jar, Redirect::to("/dashboard")).into_response())
}

/// Ends the caller's session server-side and drops the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, AppError> {
    end_session(&state, &identity.session_id).await?;
    let flash = Flash::success("Logged out successfully!");

    let jar = CookieJar::new()
        .add(cookie::removal(SESSION_COOKIE))
        .add(flash.to_cookie());

    Ok((jar, Redirect::to("/")).into_response())
}
