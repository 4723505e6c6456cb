// src/models/message.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::form::blank_as_none;

/// Represents the 'chat_messages' table. Rows are only ever appended.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
}

impl ChatMessage {
    /// Both directions of the conversation between `a` and `b`, oldest first.
    pub async fn thread<'e, E>(executor: E, a: i64, b: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, sender_id, receiver_id, content, timestamp, is_read
            FROM chat_messages
            WHERE (sender_id = ?1 AND receiver_id = ?2)
               OR (sender_id = ?2 AND receiver_id = ?1)
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(executor)
        .await
    }

    pub async fn append<'e, E>(
        executor: E,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (sender_id, receiver_id, content, timestamp, is_read)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(chrono::Utc::now())
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Flags everything `sender_id` sent to `receiver_id` as read.
    pub async fn mark_read<'e, E>(executor: E, sender_id: i64, receiver_id: i64) -> Result<u64, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE chat_messages SET is_read = 1 WHERE sender_id = ? AND receiver_id = ? AND is_read = 0",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Form body of `POST /chat/{other_user_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 5000, message = "Message is too long."))]
    pub content: Option<String>,
}
