// src/handlers/chat.rs

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        connection::{ConnectionRequest, ConnectionStatus},
        message::{ChatMessage, SendMessageForm},
        profile::Profile,
        user::{Contact, Role, User},
    },
    policy,
    utils::{
        flash::{IncomingFlash, Page},
        form::ValidForm,
        html::clean_html,
        path::ResourcePath,
        session::Identity,
    },
};

/// Resolves the counterpart and checks the pair holds an accepted connection.
async fn authorize_chat(
    pool: &SqlitePool,
    identity: &Identity,
    other_user_id: i64,
) -> Result<(User, Profile), AppError> {
    let other = User::find(pool, other_user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let other_profile = Profile::load(pool, other.role, other.id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let allowed = match policy::chat_pair(identity, other.role, other_profile.id()) {
        Some((college_id, faculty_id)) => {
            ConnectionRequest::is_accepted(pool, college_id, faculty_id).await?
        }
        None => false,
    };

    if !allowed {
        return Err(AppError::denied(
            "Chat is only available after a connection request is accepted.",
        ));
    }

    Ok((other, other_profile))
}

/// The full conversation with another user, oldest message first.
/// Messages addressed to the caller are marked read once shown.
pub async fn show_chat(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath(other_user_id): ResourcePath<i64>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let (other, other_profile) = authorize_chat(&pool, &identity, other_user_id).await?;

    let messages = ChatMessage::thread(&pool, identity.user_id, other.id).await?;
    ChatMessage::mark_read(&pool, other.id, identity.user_id).await?;

    Ok(Page::new(
        flash,
        json!({
            "other_user": {
                "id": other.id,
                "email": other.email,
                "role": other.role,
                "name": other_profile.display_name(),
            },
            "messages": messages,
        }),
    ))
}

/// Appends a message and reloads the conversation.
pub async fn send_message(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    ResourcePath(other_user_id): ResourcePath<i64>,
    ValidForm(form): ValidForm<SendMessageForm>,
) -> Result<Response, AppError> {
    let (other, _) = authorize_chat(&pool, &identity, other_user_id).await?;

    let content = form.content.map(|c| clean_html(&c)).unwrap_or_default();
    if !content.trim().is_empty() {
        ChatMessage::append(&pool, identity.user_id, other.id, &content).await?;
    }

    Ok(Redirect::to(&format!("/chat/{}", other.id)).into_response())
}

/// Everyone the caller has an accepted connection with, with unread counts.
pub async fn list_conversations(
    State(pool): State<SqlitePool>,
    Extension(identity): Extension<Identity>,
    flash: IncomingFlash,
) -> Result<impl IntoResponse, AppError> {
    let contacts = match identity.role {
        Role::College => {
            sqlx::query_as::<_, Contact>(
                r#"
                SELECT DISTINCT u.id AS user_id, u.email, f.full_name AS display_name,
                       (SELECT COUNT(*) FROM chat_messages m
                        WHERE m.sender_id = u.id AND m.receiver_id = ?1 AND m.is_read = 0) AS unread
                FROM connection_requests cr
                JOIN faculty_profiles f ON f.id = cr.faculty_id
                JOIN users u ON u.id = f.user_id
                WHERE cr.college_id = ?2 AND cr.status = ?3
                ORDER BY display_name ASC
                "#,
            )
            .bind(identity.user_id)
            .bind(identity.profile_id)
            .bind(ConnectionStatus::Accepted)
            .fetch_all(&pool)
            .await?
        }
        Role::Faculty => {
            sqlx::query_as::<_, Contact>(
                r#"
                SELECT DISTINCT u.id AS user_id, u.email, c.college_name AS display_name,
                       (SELECT COUNT(*) FROM chat_messages m
                        WHERE m.sender_id = u.id AND m.receiver_id = ?1 AND m.is_read = 0) AS unread
                FROM connection_requests cr
                JOIN college_profiles c ON c.id = cr.college_id
                JOIN users u ON u.id = c.user_id
                WHERE cr.faculty_id = ?2 AND cr.status = ?3
                ORDER BY display_name ASC
                "#,
            )
            .bind(identity.user_id)
            .bind(identity.profile_id)
            .bind(ConnectionStatus::Accepted)
            .fetch_all(&pool)
            .await?
        }
        Role::Student => Vec::new(),
    };

    Ok(Page::new(flash, json!({ "connections": contacts })))
}
