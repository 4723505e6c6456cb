// src/models/user.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::policy::Capability;

/// Account role. Decides which profile table a user owns and which
/// capabilities the user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Faculty,
    College,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Faculty, Role::College, Role::Student];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Faculty => "faculty",
            Role::College => "college",
            Role::Student => "student",
        }
    }

    /// Landing page for this role.
    pub fn dashboard_path(self) -> String {
        format!("/{}/dashboard", self.as_str())
    }

    /// Side table holding this role's profile rows.
    pub fn profile_table(self) -> &'static str {
        match self {
            Role::Faculty => "faculty_profiles",
            Role::College => "college_profiles",
            Role::Student => "student_profiles",
        }
    }

    /// Everything this role may do. Route groups check against this list.
    pub fn capabilities(self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Faculty => &[
                FacultyWorkspace,
                RespondToConnections,
                Chat,
                ViewConnections,
                ViewClasses,
                JoinClasses,
            ],
            Role::College => &[
                CollegeWorkspace,
                PostRequirements,
                SearchFaculty,
                SendConnectionRequests,
                ScheduleClasses,
                Chat,
                ViewConnections,
                ViewClasses,
                JoinClasses,
            ],
            Role::Student => &[
                StudentWorkspace,
                PostStudentRequests,
                BrowseFaculty,
                ViewConnections,
                ViewClasses,
                JoinClasses,
            ],
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub role: Role,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

/// Public view of a counterpart user (chat partner, connection).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub unread: i64,
}

/// Registration form.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[serde(alias = "user_type")]
    pub role: Role,
}

/// Login form. The declared role is part of the lookup key.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[serde(alias = "user_type")]
    pub role: Role,
}
