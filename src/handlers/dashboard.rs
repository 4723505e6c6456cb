// src/handlers/dashboard.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::profile::current_profile,
    models::{requirement::Requirement, student_request::StudentRequest},
    utils::{
        flash::{IncomingFlash, Page},
        session::Identity,
    },
};

/// Sends the caller to their role's dashboard.
pub async fn dispatch(Extension(identity): Extension<Identity>) -> Redirect {
    Redirect::to(&identity.role.dashboard_path())
}

/// Faculty landing page: own profile plus every open requirement, newest first.
pub async fn faculty_dashboard(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let profile = current_profile(&pool, &identity).await?;
    let requirements = Requirement::list_open(&pool).await?;

    Ok(Page::new(
        flash,
        json!({
            "is_complete": profile.is_complete(),
            "profile": profile,
            "requirements": requirements,
        }),
    ))
}

/// College landing page: own profile plus own requirements, newest first.
pub async fn college_dashboard(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let profile = current_profile(&pool, &identity).await?;
    let requirements = Requirement::list_for_college(&pool, identity.profile_id).await?;

    Ok(Page::new(
        flash,
        json!({
            "is_complete": profile.is_complete(),
            "profile": profile,
            "requirements": requirements,
        }),
    ))
}

/// Student landing page: own profile plus own requests, newest first.
pub async fn student_dashboard(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let profile = current_profile(&pool, &identity).await?;
    let requests = StudentRequest::list_for_student(&pool, identity.profile_id).await?;

    Ok(Page::new(
        flash,
        json!({
            "is_complete": profile.is_complete(),
            "profile": profile,
            "requests": requests,
        }),
    ))
}
