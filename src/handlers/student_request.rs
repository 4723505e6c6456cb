// src/handlers/student_request.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        requirement::PostingStatus,
        student_request::{CreateStudentRequest, StudentRequest},
    },
    utils::{
        flash::{Flash, IncomingFlash, Page},
        form::ValidForm,
        html::clean_optional,
        session::Identity,
    },
};

pub async fn post_request_form(flash: IncomingFlash) -> impl IntoResponse {
    Page::new(
        flash,
        json!({
            "form": "post_request",
            "urgency_levels": ["High", "Medium", "Low"],
        }),
    )
}

/// Posts a tutoring request for the calling student.
pub async fn post_request(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ValidForm(payload): ValidForm<CreateStudentRequest>,
) -> Result<Response, AppError> {
    sqlx::query(
        r#"
        INSERT INTO student_requests (student_id, subject, description, urgency, posted_at, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(identity.profile_id)
    .bind(&payload.subject)
    .bind(clean_optional(payload.description))
    .bind(payload.urgency)
    .bind(chrono::Utc::now())
    .bind(PostingStatus::Open)
    .execute(&pool)
    .await?;

    Ok(Flash::success("Request posted successfully!").redirect("/student/dashboard"))
}

/// Public listing of open student requests, newest first.
pub async fn browse_student_requests(
    State(pool): State<SqlitePool>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let requests = StudentRequest::list_open(&pool).await?;
    Ok(Page::new(flash, json!({ "requests": requests })))
}
