//! Test fixtures and factory functions for creating test data.

use serde_json::json;

use studyquiz_backend::db::Database;
use studyquiz_backend::models::{Category, DbQuestion};

/// Create a category for testing.
pub async fn seed_category(db: &Database, name: &str) -> Category {
    db.create_category(name, Some("seeded for tests"))
        .await
        .expect("Failed to create test category")
}

/// Seed a category with `num_questions` questions.
///
/// Question i has correct answer "Answer i" and three distractors.
pub async fn seed_questions(
    db: &Database,
    category_id: i64,
    num_questions: usize,
) -> Vec<DbQuestion> {
    let mut questions = Vec::with_capacity(num_questions);
    for i in 1..=num_questions {
        let wrong = vec![
            format!("Wrong {}a", i),
            format!("Wrong {}b", i),
            format!("Wrong {}c", i),
        ];
        let question = db
            .create_question(
                category_id,
                &format!("Question {}?", i),
                &format!("Answer {}", i),
                &wrong,
            )
            .await
            .expect("Failed to create test question");
        questions.push(question);
    }
    questions
}

/// Create a start-test request body.
pub fn start_test_request(category_id: i64, question_count: u32, practice: bool) -> serde_json::Value {
    json!({
        "category_id": category_id,
        "question_count": question_count,
        "practice": practice
    })
}

/// Build a submission answering every question correctly.
pub fn answers_all_correct(questions: &[DbQuestion]) -> serde_json::Value {
    let mut answers = serde_json::Map::new();
    for question in questions {
        answers.insert(
            question.id.to_string(),
            json!({ "answer": question.correct_answer, "time_secs": 5.0 }),
        );
    }
    json!({ "answers": answers })
}

/// Build a submission with explicit per-question answers.
pub fn answers_from(pairs: &[(i64, Option<&str>)]) -> serde_json::Value {
    let mut answers = serde_json::Map::new();
    for (question_id, answer) in pairs {
        answers.insert(question_id.to_string(), json!({ "answer": answer }));
    }
    json!({ "answers": answers })
}

/// Create a study session request body.
pub fn study_session_request(category_id: i64, duration_minutes: i32) -> serde_json::Value {
    json!({
        "category_id": category_id,
        "starts_at": chrono::Utc::now() + chrono::Duration::hours(1),
        "duration_minutes": duration_minutes,
        "description": "evening review"
    })
}
