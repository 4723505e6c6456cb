// src/handlers/connection.rs

use axum::{
    Extension, Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::DEFAULT_CONNECTION_MESSAGE,
    error::AppError,
    models::{
        connection::{
            ConnectionRequest, ConnectionResponse, ConnectionStatus, IncomingRequest,
            SendRequestForm,
        },
        profile::FacultyProfile,
    },
    policy,
    utils::{
        flash::{Flash, IncomingFlash, Page},
        html::clean_html,
        path::ResourcePath,
        session::Identity,
    },
};

const SEARCH_PAGE: &str = "/college/search-faculty";
const REQUESTS_PAGE: &str = "/faculty/requests";

/// Sends a connection request from the calling college to a faculty.
///
/// A pair that already has a request (in any state) gets an informational
/// message instead of a second row. The check and the insert are separate
/// statements, so two simultaneous submissions can still both insert.
/// A post without a form body sends the default message.
pub async fn send_request(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath(faculty_id): ResourcePath<i64>,
    form: Result<Form<SendRequestForm>, FormRejection>,
) -> Result<Response, AppError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Connection request without a usable body: {}", rejection);
            SendRequestForm::default()
        }
    };

    form.validate()
        .map_err(|e| AppError::invalid(e.to_string(), SEARCH_PAGE))?;

    FacultyProfile::find(&pool, faculty_id)
        .await?
        .ok_or(AppError::NotFound("Faculty not found".to_string()))?;

    if ConnectionRequest::find_pair(&pool, identity.profile_id, faculty_id)
        .await?
        .is_some()
    {
        return Ok(Flash::info("Request already sent!").redirect(SEARCH_PAGE));
    }

    let message = form
        .message
        .map(|m| clean_html(&m))
        .unwrap_or_else(|| DEFAULT_CONNECTION_MESSAGE.to_string());

    let request_id =
        ConnectionRequest::create(&pool, identity.profile_id, faculty_id, &message).await?;

    tracing::info!(
        "College {} sent connection request {} to faculty {}",
        identity.profile_id,
        request_id,
        faculty_id
    );

    Ok(Flash::success("Request sent successfully!").redirect(SEARCH_PAGE))
}

/// Connection requests received by the calling faculty, newest first.
pub async fn list_requests(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let requests = sqlx::query_as::<_, IncomingRequest>(
        r#"
        SELECT cr.id, cr.college_id, c.college_name, c.user_id AS college_user_id,
               cr.status, cr.message, cr.created_at
        FROM connection_requests cr
        JOIN college_profiles c ON c.id = cr.college_id
        WHERE cr.faculty_id = ?
        ORDER BY cr.created_at DESC, cr.id DESC
        "#,
    )
    .bind(identity.profile_id)
    .fetch_all(&pool)
    .await?;

    Ok(Page::new(flash, json!({ "requests": requests })))
}

/// Accepts or rejects a pending request. Only the target faculty may.
pub async fn respond_request(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath((request_id, action)): ResourcePath<(i64, String)>,
) -> Result<Response, AppError> {
    let request = ConnectionRequest::find(&pool, request_id)
        .await?
        .ok_or(AppError::NotFound("Request not found".to_string()))?;

    if !policy::may_respond(&identity, &request) {
        return Err(AppError::denied("Unauthorized!"));
    }

    let response = ConnectionResponse::parse(&action)
        .ok_or_else(|| AppError::invalid("Unknown action.", REQUESTS_PAGE))?;

    let answered = || AppError::invalid("This request has already been answered.", REQUESTS_PAGE);

    let next = request.status.respond(response).ok_or_else(answered)?;

    if !ConnectionRequest::settle(&pool, request.id, identity.profile_id, next).await? {
        return Err(answered());
    }

    tracing::info!("Faculty {} set request {} to {:?}", identity.profile_id, request.id, next);

    let flash = match next {
        ConnectionStatus::Accepted => Flash::success("Request accepted! You can now chat."),
        _ => Flash::info("Request rejected."),
    };
    Ok(flash.redirect(REQUESTS_PAGE))
}
