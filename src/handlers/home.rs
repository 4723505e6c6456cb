use axum::response::IntoResponse;
use serde_json::json;

use crate::utils::flash::{IncomingFlash, Page};

/// Landing page.
pub async fn index(flash: IncomingFlash) -> impl IntoResponse {
    Page::new(
        flash,
        json!({
            "title": "Guest Faculty Connect",
            "links": {
                "register": "/register",
                "login": "/login",
                "requirements": "/requirements",
                "student_requests": "/student-requests",
            }
        }),
    )
}
