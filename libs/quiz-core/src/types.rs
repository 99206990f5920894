//! Shared types for the quiz core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user, per-question review state maintained by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewState {
    pub attempts: u32,
    pub correct_count: u32,
    /// Consecutive correct answers, reset to 0 on any miss.
    pub streak: u32,
    pub ease: f64,
    pub avg_response_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            attempts: 0,
            correct_count: 0,
            streak: 0,
            ease: 2.5,
            avg_response_secs: 0.0,
            next_review: None,
        }
    }
}

/// Aggregated performance for one question, used by dashboard rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPerformance {
    pub question_id: i64,
    pub attempts: u32,
    pub correct_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl QuestionPerformance {
    /// Accuracy as a percentage; 0 when the question was never attempted.
    pub fn accuracy(&self) -> f64 {
        crate::stats::accuracy(self.correct_count, self.attempts)
    }
}
