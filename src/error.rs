// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::utils::flash::Flash;

/// Global Application Error Enum.
///
/// Validation and authorization failures become a redirect carrying an
/// error flash; only missing resources and internal faults produce an
/// error status.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 404 Not Found
    NotFound(String),

    // 303 -> /login
    Unauthenticated,

    // 303 -> /dashboard (wrong role, wrong party)
    Denied(String),

    // 303 -> back to the form (duplicate email, malformed input, ...)
    Invalid { message: String, redirect_to: String },
}

impl AppError {
    pub fn invalid(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        AppError::Invalid {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        AppError::Denied(message.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Unauthenticated => {
                Flash::error("Please log in to access this page.").redirect("/login")
            }
            AppError::Denied(msg) => {
                tracing::warn!("Access denied: {}", msg);
                Flash::error(msg).redirect("/dashboard")
            }
            AppError::Invalid { message, redirect_to } => {
                Flash::error(message).redirect(&redirect_to)
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
