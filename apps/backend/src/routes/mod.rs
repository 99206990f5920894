//! HTTP route handlers

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod study_sessions;
pub mod timers;
pub mod users;
