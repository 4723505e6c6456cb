// src/models/requirement.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::form::{blank_as_none, blank_as_none_parsed, trimmed};

/// Lifecycle of a posting (college requirement or student request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PostingStatus {
    Open,
    Closed,
    Filled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    #[sqlx(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    #[sqlx(rename = "Part-time")]
    PartTime,
    Visiting,
}

/// Represents the 'requirements' table, joined with the posting college's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Requirement {
    pub id: i64,
    pub college_id: i64,
    pub college_name: String,
    pub subject: String,
    pub description: Option<String>,
    pub qualification_required: Option<String>,
    pub experience_required: Option<i64>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub posted_at: chrono::DateTime<chrono::Utc>,
    pub status: PostingStatus,
}

pub const REQUIREMENT_SELECT: &str = r#"
    SELECT r.id, r.college_id, c.college_name, r.subject, r.description,
           r.qualification_required, r.experience_required, r.location,
           r.salary_range, r.employment_type, r.posted_at, r.status
    FROM requirements r
    JOIN college_profiles c ON c.id = r.college_id
"#;

impl Requirement {
    /// Every open requirement, newest first.
    pub async fn list_open<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Requirement>(&format!(
            "{REQUIREMENT_SELECT} WHERE r.status = ? ORDER BY r.posted_at DESC, r.id DESC"
        ))
        .bind(PostingStatus::Open)
        .fetch_all(executor)
        .await
    }

    /// Requirements posted by one college, newest first.
    pub async fn list_for_college<'e, E>(executor: E, college_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Requirement>(&format!(
            "{REQUIREMENT_SELECT} WHERE r.college_id = ? ORDER BY r.posted_at DESC, r.id DESC"
        ))
        .bind(college_id)
        .fetch_all(executor)
        .await
    }
}

/// DTO for posting a requirement.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRequirementRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Subject is required."))]
    pub subject: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 200))]
    pub qualification_required: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none_parsed")]
    #[validate(range(min = 0, max = 80, message = "Experience must be between 0 and 80 years."))]
    pub experience_required: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub salary_range: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub employment_type: Option<EmploymentType>,
}
