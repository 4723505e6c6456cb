// src/config.rs

use std::env;
use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;

/// How far before the scheduled start a class link becomes usable.
pub const JOIN_EARLY_MINUTES: i64 = 10;

/// Duration used when the schedule form leaves it blank.
pub const DEFAULT_CLASS_DURATION_MINUTES: i64 = 60;

/// Message attached to a connection request when the college leaves it blank.
pub const DEFAULT_CONNECTION_MESSAGE: &str = "I am interested in your profile.";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl: u64,
    /// Base URL meeting links are built on. Must end with '/'.
    pub public_base_url: String,
    pub bind_addr: String,
    /// Offset in which schedule forms are filled in.
    pub schedule_offset: FixedOffset,
    /// Lets a student with no institution on file join any class.
    pub allow_unaffiliated_student_join: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://guest_faculty.db".to_string());

        let session_secret = env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set");

        let session_ttl = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let mut public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000/".to_string());
        if !public_base_url.ends_with('/') {
            public_base_url.push('/');
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let schedule_offset = env::var("SCHEDULE_UTC_OFFSET_MINUTES")
            .ok()
            .map(|v| {
                v.parse::<i32>()
                    .ok()
                    .and_then(offset_from_minutes)
                    .expect("SCHEDULE_UTC_OFFSET_MINUTES must be minutes within (-1440, 1440)")
            })
            .unwrap_or_else(utc);

        let allow_unaffiliated_student_join = env::var("ALLOW_UNAFFILIATED_STUDENT_JOIN")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            session_secret,
            session_ttl,
            public_base_url,
            bind_addr,
            schedule_offset,
            allow_unaffiliated_student_join,
            rust_log,
        }
    }
}

/// Offset `minutes` east of UTC, if it is less than a day either way.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

fn utc() -> FixedOffset {
    Utc.fix()
}
