// src/models/profile.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    models::user::Role,
    utils::{
        form::{blank_as_none, blank_as_none_parsed, trimmed},
        html::clean_optional,
    },
};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}$").expect("phone pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Availability {
    Available,
    #[serde(rename = "Not Available")]
    #[sqlx(rename = "Not Available")]
    NotAvailable,
    #[serde(rename = "Partially Available")]
    #[sqlx(rename = "Partially Available")]
    PartiallyAvailable,
}

/// Represents the 'faculty_profiles' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FacultyProfile {
    pub id: i64,
    pub user_id: i64,
    /// Empty until the faculty fills in the profile; empty means incomplete.
    pub full_name: String,
    pub phone: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: Option<i64>,
    /// Comma-separated subject list.
    pub subjects: Option<String>,
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub availability: Option<Availability>,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub resume_url: Option<String>,
}

pub const FACULTY_COLUMNS: &str = "id, user_id, full_name, phone, qualification, experience_years, \
     subjects, specialization, location, availability, bio, linkedin_url, resume_url";

impl FacultyProfile {
    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, FacultyProfile>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty_profiles WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

/// Represents the 'college_profiles' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CollegeProfile {
    pub id: i64,
    pub user_id: i64,
    pub college_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub affiliation: Option<String>,
    pub website: Option<String>,
}

/// Represents the 'student_profiles' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    /// Institution the student attends. Matched against college names
    /// when joining classes.
    pub college_name: Option<String>,
    pub course: Option<String>,
    pub semester: Option<String>,
    pub city: Option<String>,
}

/// The one profile a user owns, selected by the user's role.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", content = "profile", rename_all = "lowercase")]
pub enum Profile {
    Faculty(FacultyProfile),
    College(CollegeProfile),
    Student(StudentProfile),
}

impl Profile {
    /// Loads the profile owned by `user_id` under `role`.
    pub async fn load<'e, E>(executor: E, role: Role, user_id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let profile = match role {
            Role::Faculty => sqlx::query_as::<_, FacultyProfile>(&format!(
                "SELECT {FACULTY_COLUMNS} FROM faculty_profiles WHERE user_id = ?"
            ))
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .map(Profile::Faculty),
            Role::College => sqlx::query_as::<_, CollegeProfile>(
                r#"
                SELECT id, user_id, college_name, contact_person, phone, address,
                       city, state, affiliation, website
                FROM college_profiles
                WHERE user_id = ?
                "#,
            )
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .map(Profile::College),
            Role::Student => sqlx::query_as::<_, StudentProfile>(
                r#"
                SELECT id, user_id, full_name, phone, college_name, course, semester, city
                FROM student_profiles
                WHERE user_id = ?
                "#,
            )
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .map(Profile::Student),
        };
        Ok(profile)
    }

    /// Inserts the blank profile row a freshly registered user starts with.
    pub async fn create_empty<'e, E>(executor: E, role: Role, user_id: i64) -> Result<i64, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let sql = format!("INSERT INTO {} (user_id) VALUES (?)", role.profile_table());
        let result = sqlx::query(&sql).bind(user_id).execute(executor).await?;
        Ok(result.last_insert_rowid())
    }

    /// Id of the profile row owned by `user_id` under `role`.
    pub async fn id_for<'e, E>(executor: E, role: Role, user_id: i64) -> Result<Option<i64>, sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        let sql = format!("SELECT id FROM {} WHERE user_id = ?", role.profile_table());
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    pub fn id(&self) -> i64 {
        match self {
            Profile::Faculty(p) => p.id,
            Profile::College(p) => p.id,
            Profile::Student(p) => p.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Profile::Faculty(p) => &p.full_name,
            Profile::College(p) => &p.college_name,
            Profile::Student(p) => &p.full_name,
        }
    }

    /// A profile without a name is incomplete and hidden from search.
    pub fn is_complete(&self) -> bool {
        !self.display_name().trim().is_empty()
    }
}

/// Faculty profile edit form.
#[derive(Debug, Deserialize, Validate)]
pub struct FacultyProfileForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub full_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 200))]
    pub qualification: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none_parsed")]
    #[validate(range(min = 0, max = 80, message = "Experience must be between 0 and 80 years."))]
    pub experience_years: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 1000))]
    pub subjects: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 200))]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub availability: Option<Availability>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "LinkedIn URL is not valid."))]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Resume URL is not valid."))]
    pub resume_url: Option<String>,
}

impl FacultyProfileForm {
    pub async fn apply<'e, E>(self, executor: E, profile_id: i64) -> Result<(), sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE faculty_profiles
            SET full_name = ?, phone = ?, qualification = ?, experience_years = ?,
                subjects = ?, specialization = ?, location = ?, availability = ?,
                bio = ?, linkedin_url = ?, resume_url = ?
            WHERE id = ?
            "#,
        )
        .bind(self.full_name)
        .bind(self.phone)
        .bind(self.qualification)
        .bind(self.experience_years)
        .bind(self.subjects)
        .bind(self.specialization)
        .bind(self.location)
        .bind(self.availability)
        .bind(clean_optional(self.bio))
        .bind(self.linkedin_url)
        .bind(self.resume_url)
        .bind(profile_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// College profile edit form.
#[derive(Debug, Deserialize, Validate)]
pub struct CollegeProfileForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "College name is required."))]
    pub college_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 1000))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 200))]
    pub affiliation: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "Website URL is not valid."))]
    pub website: Option<String>,
}

impl CollegeProfileForm {
    pub async fn apply<'e, E>(self, executor: E, profile_id: i64) -> Result<(), sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE college_profiles
            SET college_name = ?, contact_person = ?, phone = ?, address = ?,
                city = ?, state = ?, affiliation = ?, website = ?
            WHERE id = ?
            "#,
        )
        .bind(self.college_name)
        .bind(self.contact_person)
        .bind(self.phone)
        .bind(self.address)
        .bind(self.city)
        .bind(self.state)
        .bind(self.affiliation)
        .bind(self.website)
        .bind(profile_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// Student profile edit form.
#[derive(Debug, Deserialize, Validate)]
pub struct StudentProfileForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub full_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(regex(path = *PHONE_RE, message = "Phone number is not valid."))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 200))]
    pub college_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100))]
    pub city: Option<String>,
}

impl StudentProfileForm {
    pub async fn apply<'e, E>(self, executor: E, profile_id: i64) -> Result<(), sqlx::Error>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE student_profiles
            SET full_name = ?, phone = ?, college_name = ?, course = ?, semester = ?, city = ?
            WHERE id = ?
            "#,
        )
        .bind(self.full_name)
        .bind(self.phone)
        .bind(self.college_name)
        .bind(self.course)
        .bind(self.semester)
        .bind(self.city)
        .bind(profile_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
