// src/models/mod.rs

pub mod connection;
pub mod message;
pub mod online_class;
pub mod profile;
pub mod requirement;
pub mod student_request;
pub mod user;
