// src/models/student_request.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    models::requirement::PostingStatus,
    utils::form::{blank_as_none, trimmed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

/// Represents the 'student_requests' table, joined with the student's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentRequest {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub subject: String,
    pub description: Option<String>,
    pub urgency: Option<Urgency>,
    pub posted_at: chrono::DateTime<chrono::Utc>,
    pub status: PostingStatus,
}

const STUDENT_REQUEST_SELECT: &str = r#"
    SELECT r.id, r.student_id, s.full_name AS student_name, r.subject,
           r.description, r.urgency, r.posted_at, r.status
    FROM student_requests r
    JOIN student_profiles s ON s.id = r.student_id
"#;

impl StudentRequest {
    pub async fn list_open<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, StudentRequest>(&format!(
            "{STUDENT_REQUEST_SELECT} WHERE r.status = ? ORDER BY r.posted_at DESC, r.id DESC"
        ))
        .bind(PostingStatus::Open)
        .fetch_all(executor)
        .await
    }

    pub async fn list_for_student<'e, E>(executor: E, student_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, StudentRequest>(&format!(
            "{STUDENT_REQUEST_SELECT} WHERE r.student_id = ? ORDER BY r.posted_at DESC, r.id DESC"
        ))
        .bind(student_id)
        .fetch_all(executor)
        .await
    }
}

/// DTO for posting a tutoring request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Subject is required."))]
    pub subject: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub urgency: Option<Urgency>,
}
