// src/handlers/mod.rs

pub mod auth;
pub mod chat;
pub mod classes;
pub mod connection;
pub mod dashboard;
pub mod home;
pub mod profile;
pub mod requirement;
pub mod search;
pub mod student_request;
