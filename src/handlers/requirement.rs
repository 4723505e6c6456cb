// src/handlers/requirement.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::requirement::{CreateRequirementRequest, PostingStatus, Requirement},
    utils::{
        flash::{Flash, IncomingFlash, Page},
        form::ValidForm,
        html::clean_optional,
        session::Identity,
    },
};

pub async fn post_requirement_form(flash: IncomingFlash) -> impl IntoResponse {
    Page::new(
        flash,
        json!({
            "form": "post_requirement",
            "employment_types": ["Full-time", "Part-time", "Visiting"],
        }),
    )
}

/// Posts a new open requirement for the calling college.
pub async fn post_requirement(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ValidForm(payload): ValidForm<CreateRequirementRequest>,
) -> Result<Response, AppError> {
    let requirement_id = sqlx::query(
        r#"
        INSERT INTO requirements
            (college_id, subject, description, qualification_required, experience_required,
             location, salary_range, employment_type, posted_at, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(identity.profile_id)
    .bind(&payload.subject)
    .bind(clean_optional(payload.description))
    .bind(payload.qualification_required)
    .bind(payload.experience_required)
    .bind(payload.location)
    .bind(payload.salary_range)
    .bind(payload.employment_type)
    .bind(chrono::Utc::now())
    .bind(PostingStatus::Open)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to post requirement: {:?}", e);
        AppError::from(e)
    })?
    .last_insert_rowid();

    tracing::info!("College {} posted requirement {}", identity.profile_id, requirement_id);

    Ok(Flash::success("Requirement posted successfully!").redirect("/college/dashboard"))
}

/// Public listing of open requirements, newest first.
pub async fn browse_requirements(
    State(pool): State<SqlitePool>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let requirements = Requirement::list_open(&pool).await?;
    Ok(Page::new(flash, json!({ "requirements": requirements })))
}
