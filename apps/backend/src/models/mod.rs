//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

// Re-export shared types from quiz-core
pub use quiz_core::types::{QuestionPerformance, ReviewState};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Question category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Category with its question count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub question_count: i64,
}

/// Question stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuestion {
    pub id: i64,
    pub category_id: i64,
    pub question_text: String,
    pub correct_answer: String,
    pub wrong_answers: Vec<String>,
    pub ease: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-user, per-question performance record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPerformance {
    pub user_id: Uuid,
    pub question_id: i64,
    pub attempts: i32,
    pub correct_count: i32,
    pub streak: i32,
    pub ease: f64,
    pub avg_response_secs: f64,
    pub next_review: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbPerformance {
    /// Convert to quiz-core ReviewState
    pub fn to_review_state(&self) -> ReviewState {
        ReviewState {
            attempts: self.attempts as u32,
            correct_count: self.correct_count as u32,
            streak: self.streak as u32,
            ease: self.ease,
            avg_response_secs: self.avg_response_secs,
            next_review: Some(self.next_review),
        }
    }
}

/// Test record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTest {
    pub id: i64,
    pub user_id: Uuid,
    pub category_id: Option<i64>,
    pub is_practice: bool,
    pub score: Option<f64>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Test question joined with its source question, for grading and rendering
#[derive(Debug, Clone, FromRow)]
pub struct TestQuestionRow {
    pub id: i64,
    pub test_id: i64,
    pub question_id: i64,
    pub display_order: i32,
    pub options: Vec<String>,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub question_text: String,
    pub correct_answer: String,
    pub question_ease: f64,
}

/// Timer session, server-persisted; the client holds only the id
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimerSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<i64>,
    pub study_session_id: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
}

/// Scheduled study session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudySession {
    pub id: i64,
    pub user_id: Uuid,
    pub category_id: i64,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Performance record joined with question info, for dashboard rollups
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceRow {
    pub question_id: i64,
    pub question_text: String,
    pub category: String,
    pub attempts: i32,
    pub correct_count: i32,
    pub ease: f64,
    pub avg_response_secs: f64,
    pub next_review: DateTime<Utc>,
}

impl PerformanceRow {
    /// Convert to the quiz-core aggregation record
    pub fn to_question_performance(&self) -> QuestionPerformance {
        QuestionPerformance {
            question_id: self.question_id,
            attempts: self.attempts as u32,
            correct_count: self.correct_count as u32,
            next_review: Some(self.next_review),
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatusResponse {
    pub user_id: Uuid,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategorySummary>,
}

// Test types

#[derive(Debug, Serialize, Deserialize)]
pub struct StartTestRequest {
    pub category_id: i64,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    #[serde(default)]
    pub practice: bool,
}

fn default_question_count() -> u32 {
    20
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestQuestionView {
    pub question_id: i64,
    pub position: i32,
    pub question_text: String,
    pub options: Vec<String>,
    /// Only present for practice tests, so the client can show immediate
    /// correctness feedback before submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestView {
    pub test_id: i64,
    pub category_id: Option<i64>,
    pub is_practice: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<TestQuestionView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestListResponse {
    pub tests: Vec<DbTest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    /// Explicit null counts as answered-incorrectly, not missing.
    pub answer: Option<String>,
    #[serde(default)]
    pub time_secs: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTestRequest {
    pub answers: HashMap<i64, SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub correct: bool,
    pub correct_answer: String,
    pub user_answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitTestResponse {
    Practice {
        score: f64,
        correct_count: usize,
        total_questions: usize,
        results: Vec<QuestionResult>,
    },
    Completed {
        redirect: String,
    },
}

/// Outcome of a scoring transaction
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub is_practice: bool,
    pub results: Vec<QuestionResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestQuestionResultView {
    pub question_id: i64,
    pub position: i32,
    pub question_text: String,
    pub options: Vec<String>,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub correct_answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestResultsResponse {
    pub test_id: i64,
    pub score: f64,
    pub questions: Vec<TestQuestionResultView>,
}

// Timer types

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct StartTimerRequest {
    pub category_id: Option<i64>,
    pub study_session_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartTimerResponse {
    pub timer_id: Uuid,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StopTimerResponse {
    pub timer_id: Uuid,
    pub duration_secs: f64,
}

// Study session types

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStudySessionRequest {
    pub category_id: i64,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudySessionListResponse {
    pub sessions: Vec<StudySession>,
}

// Dashboard types

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardSummaryResponse {
    pub total_questions: i64,
    pub total_attempts: i64,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CategoryStat {
    pub name: String,
    pub accuracy: f64,
    pub avg_response_time: f64,
    pub avg_ease: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryStatsResponse {
    pub categories: Vec<CategoryStat>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub tests_taken: i64,
    pub avg_score: f64,
    pub study_time: f64,
    pub questions_practiced: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyProgressResponse {
    pub days: Vec<DailyProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeakArea {
    pub question_id: i64,
    pub question_text: String,
    pub category: String,
    pub accuracy: f64,
    pub attempts: i32,
    pub next_review: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeakAreasResponse {
    pub weak_areas: Vec<WeakArea>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengingQuestion {
    pub question_id: i64,
    pub question_text: String,
    pub category: String,
    pub accuracy: f64,
    pub attempts: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengingResponse {
    pub questions: Vec<ChallengingQuestion>,
}

// Dashboard query params

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyProgressQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeakAreasQuery {
    pub category_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengingQuery {
    pub min_attempts: Option<u32>,
}
