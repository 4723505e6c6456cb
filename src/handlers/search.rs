// src/handlers/search.rs

use axum::{
    Extension,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        connection::ConnectionRequest,
        profile::{FACULTY_COLUMNS, FacultyProfile},
    },
    utils::{
        flash::{IncomingFlash, Page},
        form::blank_as_none,
        path::ResourcePath,
        session::Identity,
    },
};

/// Query parameters for faculty search. Blank values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub qualification: Option<String>,
}

/// Complete faculty profiles whose fields contain every given term.
///
/// Matching is plain case-sensitive substring containment (`instr`), so
/// "Math" also hits "Mathematics". Incomplete profiles never appear.
pub async fn find_faculty(
    pool: &SqlitePool,
    subject: Option<&str>,
    location: Option<&str>,
    qualification: Option<&str>,
) -> Result<Vec<FacultyProfile>, sqlx::Error> {
    sqlx::query_as::<_, FacultyProfile>(&format!(
        r#"
        SELECT {FACULTY_COLUMNS}
        FROM faculty_profiles
        WHERE full_name != ''
          AND (?1 IS NULL OR instr(subjects, ?1) > 0)
          AND (?2 IS NULL OR instr(location, ?2) > 0)
          AND (?3 IS NULL OR instr(qualification, ?3) > 0)
        ORDER BY id ASC
        "#
    ))
    .bind(subject)
    .bind(location)
    .bind(qualification)
    .fetch_all(pool)
    .await
}

/// College-facing search: subject, location and qualification.
pub async fn college_search(
    State(pool): State<SqlitePool>,
    Query(params): Query<SearchParams>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let faculties = find_faculty(
        &pool,
        params.subject.as_deref(),
        params.location.as_deref(),
        params.qualification.as_deref(),
    )
    .await?;

    Ok(Page::new(
        flash,
        json!({
            "filters": {
                "subject": params.subject,
                "location": params.location,
                "qualification": params.qualification,
            },
            "faculties": faculties,
        }),
    ))
}

/// Student-facing search: subject and location only.
pub async fn student_search(
    State(pool): State<SqlitePool>,
    Query(params): Query<SearchParams>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let faculties = find_faculty(
        &pool,
        params.subject.as_deref(),
        params.location.as_deref(),
        None,
    )
    .await?;

    Ok(Page::new(
        flash,
        json!({
            "filters": {
                "subject": params.subject,
                "location": params.location,
            },
            "faculties": faculties,
        }),
    ))
}

/// A single faculty profile as a college sees it, with the state of any
/// connection request between the two.
pub async fn view_faculty(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath(faculty_id): ResourcePath<i64>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let faculty = FacultyProfile::find(&pool, faculty_id)
        .await?
        .ok_or(AppError::NotFound("Faculty not found".to_string()))?;

    let connection = ConnectionRequest::find_pair(&pool, identity.profile_id, faculty_id).await?;

    Ok(Page::new(
        flash,
        json!({
            "faculty": faculty,
            "connection_status": connection.map(|c| c.status),
        }),
    ))
}
