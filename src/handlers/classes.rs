// src/handlers/classes.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::DEFAULT_CLASS_DURATION_MINUTES,
    error::AppError,
    models::{
        connection::ConnectionRequest,
        online_class::{
            ClassStatus, NewClass, OnlineClass, ScheduleClassForm, WindowPosition,
            generate_token, meeting_link, parse_schedule,
        },
        profile::FacultyProfile,
        user::Role,
    },
    policy,
    state::AppState,
    utils::{
        flash::{Flash, IncomingFlash, Page},
        form::ValidForm,
        path::ResourcePath,
        session::Identity,
    },
};

const CLASSES_PAGE: &str = "/classes";

/// Loads the faculty and checks the calling college is connected to it.
async fn connected_faculty(
    pool: &SqlitePool,
    identity: &Identity,
    faculty_id: i64,
) -> Result<FacultyProfile, AppError> {
    let faculty = FacultyProfile::find(pool, faculty_id)
        .await?
        .ok_or(AppError::NotFound("Faculty not found".to_string()))?;

    if !ConnectionRequest::is_accepted(pool, identity.profile_id, faculty_id).await? {
        return Err(AppError::denied(
            "You must have an accepted connection to schedule a class.",
        ));
    }

    Ok(faculty)
}

pub async fn schedule_form(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath(faculty_id): ResourcePath<i64>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let faculty = connected_faculty(&pool, &identity, faculty_id).await?;

    Ok(Page::new(
        flash,
        json!({
            "faculty": faculty,
            "default_duration": DEFAULT_CLASS_DURATION_MINUTES,
        }),
    ))
}

/// Schedules a class with a connected faculty.
///
/// The form's date and time are read in the configured offset and stored
/// as UTC. A malformed date or time creates nothing.
pub async fn schedule_class(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ResourcePath(faculty_id): ResourcePath<i64>,
    ValidForm(form): ValidForm<ScheduleClassForm>,
) -> Result<Response, AppError> {
    connected_faculty(&state.pool, &identity, faculty_id).await?;

    let Some(schedule_time) = parse_schedule(&form.date, &form.time, state.config.schedule_offset) else {
        return Err(AppError::invalid(
            "Invalid date or time format. Please try again.",
            format!("/college/schedule-class/{faculty_id}"),
        ));
    };

    let token = generate_token();
    let link = meeting_link(&state.config.public_base_url, &token)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let class_id = OnlineClass::create(
        &state.pool,
        NewClass {
            college_id: identity.profile_id,
            faculty_id,
            subject: &form.subject,
            schedule_time,
            duration_minutes: form.duration.unwrap_or(DEFAULT_CLASS_DURATION_MINUTES),
            meeting_link: &link,
            secure_token: &token,
        },
    )
    .await?;

    tracing::info!(
        "College {} scheduled class {} with faculty {} at {}",
        identity.profile_id,
        class_id,
        faculty_id,
        schedule_time
    );

    Ok(Flash::success("Online class scheduled successfully!").redirect(CLASSES_PAGE))
}

/// Colleges and faculty see their own classes; students see every
/// scheduled class.
pub async fn list_classes(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let classes = match identity.role {
        Role::College => OnlineClass::list_for_college(&pool, identity.profile_id).await?,
        Role::Faculty => OnlineClass::list_for_faculty(&pool, identity.profile_id).await?,
        Role::Student => OnlineClass::list_scheduled(&pool).await?,
    };

    Ok(Page::new(flash, json!({ "classes": classes, "now": Utc::now() })))
}

/// Opens a class room by its link token.
///
/// Outside the join window nobody gets in: too early is informational,
/// too late marks the class Completed. Inside it, the policy decides.
pub async fn join_class(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ResourcePath(token): ResourcePath<String>,
    flash: IncomingFlash,
) -> Result<Response, AppError> {
    let class = OnlineClass::find_by_token(&state.pool, &token)
        .await?
        .ok_or(AppError::NotFound("Class not found".to_string()))?;

    if class.status == ClassStatus::Cancelled {
        return Ok(Flash::error("This class has been cancelled.").redirect(CLASSES_PAGE));
    }

    let window = class.join_window();
    match window.position(Utc::now()) {
        WindowPosition::Early => {
            return Ok(Flash::info("Class has not started yet.").redirect(CLASSES_PAGE));
        }
        WindowPosition::Closed => {
            if OnlineClass::mark_completed(&state.pool, class.id).await? {
                tracing::info!("Class {} completed on late join attempt", class.id);
            }
            return Ok(Flash::error("This class link has expired.").redirect(CLASSES_PAGE));
        }
        WindowPosition::Open => {}
    }

    let institution = match identity.role {
        Role::Student => sqlx::query_scalar::<_, Option<String>>(
            "SELECT college_name FROM student_profiles WHERE id = ?",
        )
        .bind(identity.profile_id)
        .fetch_one(&state.pool)
        .await?,
        _ => None,
    };

    if !policy::may_join(
        &identity,
        &class,
        institution.as_deref(),
        state.config.allow_unaffiliated_student_join,
    ) {
        return Err(AppError::denied("You are not authorized to join this class."));
    }

    Ok(Page::new(
        flash,
        json!({
            "online_class": class,
            "opens_at": window.opens_at,
            "closes_at": window.closes_at,
        }),
    )
    .into_response())
}
