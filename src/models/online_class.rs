// src/models/online_class.rs

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::{
    config::JOIN_EARLY_MINUTES,
    utils::form::{blank_as_none_parsed, trimmed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ClassStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// Represents the 'online_classes' table, joined with both parties' names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnlineClass {
    pub id: i64,
    pub college_id: i64,
    pub college_name: String,
    pub faculty_id: i64,
    pub faculty_name: String,
    pub subject: String,
    /// Start time, always stored in UTC.
    pub schedule_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub meeting_link: String,
    #[serde(skip)]
    pub secure_token: String,
    pub status: ClassStatus,
    pub created_at: DateTime<Utc>,
}

const CLASS_SELECT: &str = r#"
    SELECT o.id, o.college_id, c.college_name, o.faculty_id, f.full_name AS faculty_name,
           o.subject, o.schedule_time, o.duration_minutes, o.meeting_link,
           o.secure_token, o.status, o.created_at
    FROM online_classes o
    JOIN college_profiles c ON c.id = o.college_id
    JOIN faculty_profiles f ON f.id = o.faculty_id
"#;

/// Values needed to insert a class row.
#[derive(Debug, Clone)]
pub struct NewClass<'a> {
    pub college_id: i64,
    pub faculty_id: i64,
    pub subject: &'a str,
    pub schedule_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub meeting_link: &'a str,
    pub secure_token: &'a str,
}

impl OnlineClass {
    pub async fn find_by_token<'e, E>(executor: E, token: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, OnlineClass>(&format!("{CLASS_SELECT} WHERE o.secure_token = ?"))
            .bind(token)
            .fetch_optional(executor)
            .await
    }

    pub async fn list_for_college<'e, E>(executor: E, college_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, OnlineClass>(&format!(
            "{CLASS_SELECT} WHERE o.college_id = ? ORDER BY o.schedule_time ASC, o.id ASC"
        ))
        .bind(college_id)
        .fetch_all(executor)
        .await
    }

    pub async fn list_for_faculty<'e, E>(executor: E, faculty_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, OnlineClass>(&format!(
            "{CLASS_SELECT} WHERE o.faculty_id = ? ORDER BY o.schedule_time ASC, o.id ASC"
        ))
        .bind(faculty_id)
        .fetch_all(executor)
        .await
    }

    pub async fn list_scheduled<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, OnlineClass>(&format!(
            "{CLASS_SELECT} WHERE o.status = ? ORDER BY o.schedule_time ASC, o.id ASC"
        ))
        .bind(ClassStatus::Scheduled)
        .fetch_all(executor)
        .await
    }

    pub async fn create<'e, E>(executor: E, new: NewClass<'_>) -> Result<i64, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO online_classes
                (college_id, faculty_id, subject, schedule_time, duration_minutes,
                 meeting_link, secure_token, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.college_id)
        .bind(new.faculty_id)
        .bind(new.subject)
        .bind(new.schedule_time)
        .bind(new.duration_minutes)
        .bind(new.meeting_link)
        .bind(new.secure_token)
        .bind(ClassStatus::Scheduled)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Scheduled -> Completed. Other states are left alone.
    pub async fn mark_completed<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query("UPDATE online_classes SET status = ? WHERE id = ? AND status = ?")
            .bind(ClassStatus::Completed)
            .bind(id)
            .bind(ClassStatus::Scheduled)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub fn join_window(&self) -> JoinWindow {
        JoinWindow::new(self.schedule_time, self.duration_minutes)
    }
}

/// Where "now" falls relative to a class's join window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Early,
    Open,
    Closed,
}

/// `[start - 10 min, start + duration]`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinWindow {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl JoinWindow {
    pub fn new(start: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            opens_at: start - Duration::minutes(JOIN_EARLY_MINUTES),
            closes_at: start + Duration::minutes(duration_minutes),
        }
    }

    pub fn position(&self, now: DateTime<Utc>) -> WindowPosition {
        if now < self.opens_at {
            WindowPosition::Early
        } else if now > self.closes_at {
            WindowPosition::Closed
        } else {
            WindowPosition::Open
        }
    }
}

/// Parses the schedule form's date (`YYYY-MM-DD`) and time (`HH:MM` or
/// `HH:MM:SS`, seconds dropped) entered at `offset`, returning UTC.
pub fn parse_schedule(date: &str, time: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let time = time.trim();
    let time = time.get(..5).unwrap_or(time);
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date.trim(), time), "%Y-%m-%d %H:%M").ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Unguessable token identifying a class link.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `{base}join-class/{token}`.
pub fn meeting_link(base_url: &str, token: &str) -> Result<String, url::ParseError> {
    Ok(Url::parse(base_url)?.join(&format!("join-class/{token}"))?.to_string())
}

/// Form body of `POST /college/schedule-class/{faculty_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleClassForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Subject is required."))]
    pub subject: String,
    pub date: String,
    pub time: String,
    #[serde(default, deserialize_with = "blank_as_none_parsed")]
    #[validate(range(
        min = 1,
        max = 480,
        message = "Duration must be between 1 and 480 minutes."
    ))]
    pub duration: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn parses_minutes_and_seconds_forms() {
        let expected = utc("2025-03-10T14:30:00Z");
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(parse_schedule("2025-03-10", "14:30", offset), Some(expected));
        assert_eq!(parse_schedule("2025-03-10", "14:30:59", offset), Some(expected));
    }

    #[test]
    fn converts_local_entry_to_utc() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(
            parse_schedule("2025-03-10", "14:30", ist),
            Some(utc("2025-03-10T09:00:00Z"))
        );
    }

    #[test]
    fn rejects_malformed_input() {
        let offset = FixedOffset::east_opt(0).unwrap();
        assert_eq!(parse_schedule("10/03/2025", "14:30", offset), None);
        assert_eq!(parse_schedule("2025-03-10", "2pm", offset), None);
        assert_eq!(parse_schedule("2025-03-10", "", offset), None);
        assert_eq!(parse_schedule("2025-02-30", "10:00", offset), None);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let start = utc("2025-03-10T10:00:00Z");
        let window = JoinWindow::new(start, 45);

        assert_eq!(window.position(utc("2025-03-10T09:49:59Z")), WindowPosition::Early);
        assert_eq!(window.position(utc("2025-03-10T09:50:00Z")), WindowPosition::Open);
        assert_eq!(window.position(utc("2025-03-10T10:20:00Z")), WindowPosition::Open);
        assert_eq!(window.position(utc("2025-03-10T10:45:00Z")), WindowPosition::Open);
        assert_eq!(window.position(utc("2025-03-10T10:45:01Z")), WindowPosition::Closed);
    }

    #[test]
    fn meeting_link_embeds_token() {
        let link = meeting_link("http://localhost:5000/", "abc-123").unwrap();
        assert_eq!(link, "http://localhost:5000/join-class/abc-123");

        let nested = meeting_link("https://example.org/app/", "t").unwrap();
        assert_eq!(nested, "https://example.org/app/join-class/t");
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
