// src/models/connection.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::form::blank_as_none;

/// Pending -> Accepted | Rejected. Both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// The faculty's answer to a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionResponse {
    Accept,
    Reject,
}

impl ConnectionResponse {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "accept" => Some(ConnectionResponse::Accept),
            "reject" => Some(ConnectionResponse::Reject),
            _ => None,
        }
    }
}

impl ConnectionStatus {
    /// Applies a response. Only a pending request can be answered.
    pub fn respond(self, response: ConnectionResponse) -> Option<ConnectionStatus> {
        match (self, response) {
            (ConnectionStatus::Pending, ConnectionResponse::Accept) => Some(ConnectionStatus::Accepted),
            (ConnectionStatus::Pending, ConnectionResponse::Reject) => Some(ConnectionStatus::Rejected),
            _ => None,
        }
    }
}

/// Represents the 'connection_requests' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConnectionRequest {
    pub id: i64,
    pub college_id: i64,
    pub faculty_id: i64,
    pub status: ConnectionStatus,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ConnectionRequest {
    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, college_id, faculty_id, status, message, created_at
            FROM connection_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Earliest request between the pair, whatever its status.
    pub async fn find_pair<'e, E>(
        executor: E,
        college_id: i64,
        faculty_id: i64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, ConnectionRequest>(
            r#"
            SELECT id, college_id, faculty_id, status, message, created_at
            FROM connection_requests
            WHERE college_id = ? AND faculty_id = ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(college_id)
        .bind(faculty_id)
        .fetch_optional(executor)
        .await
    }

    /// Whether the pair holds an accepted connection.
    pub async fn is_accepted<'e, E>(
        executor: E,
        college_id: i64,
        faculty_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM connection_requests
            WHERE college_id = ? AND faculty_id = ? AND status = ?
            LIMIT 1
            "#,
        )
        .bind(college_id)
        .bind(faculty_id)
        .bind(ConnectionStatus::Accepted)
        .fetch_optional(executor)
        .await?;
        Ok(found.is_some())
    }

    pub async fn create<'e, E>(
        executor: E,
        college_id: i64,
        faculty_id: i64,
        message: &str,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO connection_requests (college_id, faculty_id, status, message, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(college_id)
        .bind(faculty_id)
        .bind(ConnectionStatus::Pending)
        .bind(message)
        .bind(chrono::Utc::now())
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Moves a pending request owned by `faculty_id` to `status`.
    /// Returns false when the row was no longer pending.
    pub async fn settle<'e, E>(
        executor: E,
        id: i64,
        faculty_id: i64,
        status: ConnectionStatus,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE connection_requests
            SET status = ?
            WHERE id = ? AND faculty_id = ? AND status = ?
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(faculty_id)
        .bind(ConnectionStatus::Pending)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// A request as the receiving faculty sees it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IncomingRequest {
    pub id: i64,
    pub college_id: i64,
    pub college_name: String,
    /// Account id of the college, used to open the chat.
    pub college_user_id: i64,
    pub status: ConnectionStatus,
    pub message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Form body of `POST /college/send-request/{faculty_id}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SendRequestForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        assert_eq!(
            ConnectionStatus::Pending.respond(ConnectionResponse::Accept),
            Some(ConnectionStatus::Accepted)
        );
        assert_eq!(
            ConnectionStatus::Pending.respond(ConnectionResponse::Reject),
            Some(ConnectionStatus::Rejected)
        );
    }

    #[test]
    fn answered_requests_are_terminal() {
        for status in [ConnectionStatus::Accepted, ConnectionStatus::Rejected] {
            assert_eq!(status.respond(ConnectionResponse::Accept), None);
            assert_eq!(status.respond(ConnectionResponse::Reject), None);
        }
    }

    #[test]
    fn only_known_actions_parse() {
        assert_eq!(ConnectionResponse::parse("accept"), Some(ConnectionResponse::Accept));
        assert_eq!(ConnectionResponse::parse("reject"), Some(ConnectionResponse::Reject));
        assert_eq!(ConnectionResponse::parse("Accept"), None);
        assert_eq!(ConnectionResponse::parse("delete"), None);
    }
}
