// src/handlers/profile.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::profile::{CollegeProfileForm, FacultyProfileForm, Profile, StudentProfileForm},
    utils::{
        flash::{Flash, IncomingFlash, Page},
        form::ValidForm,
        session::Identity,
    },
};

/// Loads the caller's own profile.
pub async fn current_profile(pool: &SqlitePool, identity: &Identity) -> Result<Profile, AppError> {
    Profile::load(pool, identity.role, identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Profile edit page. Serves all three `/{role}/profile` routes; the
/// route group's capability guarantees the role matches the prefix.
pub async fn show_profile(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let profile = current_profile(&pool, &identity).await?;
    let is_complete = profile.is_complete();

    Ok(Page::new(
        flash,
        json!({ "profile": profile, "is_complete": is_complete }),
    ))
}

fn saved(identity: &Identity) -> Response {
    Flash::success("Profile updated successfully!").redirect(&identity.role.dashboard_path())
}

pub async fn update_faculty_profile(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ValidForm(form): ValidForm<FacultyProfileForm>,
) -> Result<Response, AppError> {
    form.apply(&pool, identity.profile_id).await?;
    Ok(saved(&identity))
}

pub async fn update_college_profile(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ValidForm(form): ValidForm<CollegeProfileForm>,
) -> Result<Response, AppError> {
    form.apply(&pool, identity.profile_id).await?;
    Ok(saved(&identity))
}

pub async fn update_student_profile(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ValidForm(form): ValidForm<StudentProfileForm>,
) -> Result<Response, AppError> {
    form.apply(&pool, identity.profile_id).await?;
    Ok(saved(&identity))
}
