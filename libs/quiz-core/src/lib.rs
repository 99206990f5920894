//! Core quiz library shared by the backend service.
//!
//! Provides:
//! - Spaced repetition scheduler (ease/streak based review intervals)
//! - Answer grading and test scoring
//! - Question selection and answer-option shuffling for test building
//! - Performance aggregation helpers (weak areas, challenging questions)

pub mod scheduler;
pub mod scoring;
pub mod selection;
pub mod stats;
pub mod types;

pub use scheduler::{ReviewOutcome, Scheduler};
pub use scoring::{grade, score_percentage};
pub use selection::{plan_test, shuffle_options};
pub use stats::{accuracy, challenging, weak_areas, DEFAULT_MIN_SAMPLE, DEFAULT_WEAK_THRESHOLD};
pub use types::{QuestionPerformance, ReviewState};
