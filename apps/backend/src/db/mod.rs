//! PostgreSQL database operations

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use quiz_core::{scoring, Scheduler};

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, name: Option<&str>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, token, name)
            VALUES ($1, $2, $3)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Category Repository ===

    /// Create a category
    pub async fn create_category(&self, name: &str, description: Option<&str>) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Get category by id
    pub async fn get_category(&self, category_id: i64) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// List categories with question counts
    pub async fn list_categories(&self) -> Result<Vec<CategorySummary>> {
        let categories = sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT c.id, c.name, c.description, COUNT(q.id) AS question_count
            FROM categories c
            LEFT JOIN questions q ON q.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // === Question Repository ===

    /// Create a question in the bank
    pub async fn create_question(
        &self,
        category_id: i64,
        question_text: &str,
        correct_answer: &str,
        wrong_answers: &[String],
    ) -> Result<DbQuestion> {
        let question = sqlx::query_as::<_, DbQuestion>(
            r#"
            INSERT INTO questions (category_id, question_text, correct_answer, wrong_answers)
            VALUES ($1, $2, $3, $4)
            RETURNING id, category_id, question_text, correct_answer, wrong_answers, ease, created_at
            "#,
        )
        .bind(category_id)
        .bind(question_text)
        .bind(correct_answer)
        .bind(wrong_answers)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    /// Count questions in a category
    pub async fn count_questions(&self, category_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Question ids in a category that are due for review or never attempted
    pub async fn get_due_or_new_question_ids(
        &self,
        user_id: Uuid,
        category_id: i64,
    ) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT q.id
            FROM questions q
            LEFT JOIN performance p ON p.question_id = q.id AND p.user_id = $1
            WHERE q.category_id = $2
              AND (p.question_id IS NULL OR p.next_review <= NOW())
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Question ids in a category already attempted and not yet due
    pub async fn get_reviewed_question_ids(
        &self,
        user_id: Uuid,
        category_id: i64,
    ) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT q.id
            FROM questions q
            JOIN performance p ON p.question_id = q.id AND p.user_id = $1
            WHERE q.category_id = $2
              AND p.next_review > NOW()
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Fetch questions by id
    pub async fn get_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<DbQuestion>> {
        let questions = sqlx::query_as::<_, DbQuestion>(
            r#"
            SELECT id, category_id, question_text, correct_answer, wrong_answers, ease, created_at
            FROM questions
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    // === Test Repository ===

    /// Create a test with its question sequence and persisted option order
    pub async fn create_test(
        &self,
        user_id: Uuid,
        category_id: i64,
        is_practice: bool,
        entries: &[(i64, Vec<String>)],
    ) -> Result<DbTest> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, DbTest>(
            r#"
            INSERT INTO tests (user_id, category_id, is_practice)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, category_id, is_practice, score, completed, created_at
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(is_practice)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (question_id, options)) in entries.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO test_questions (test_id, question_id, display_order, options)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(test.id)
            .bind(question_id)
            .bind(position as i32)
            .bind(options)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(test)
    }

    /// Get test by id
    pub async fn get_test(&self, test_id: i64) -> Result<Option<DbTest>> {
        let test = sqlx::query_as::<_, DbTest>(
            r#"
            SELECT id, user_id, category_id, is_practice, score, completed, created_at
            FROM tests
            WHERE id = $1
            "#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(test)
    }

    /// List a user's tests, most recent first
    pub async fn list_tests(&self, user_id: Uuid) -> Result<Vec<DbTest>> {
        let tests = sqlx::query_as::<_, DbTest>(
            r#"
            SELECT id, user_id, category_id, is_practice, score, completed, created_at
            FROM tests
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tests)
    }

    /// Get a test's questions in sequence order, joined with the bank
    pub async fn get_test_questions(&self, test_id: i64) -> Result<Vec<TestQuestionRow>> {
        let questions = sqlx::query_as::<_, TestQuestionRow>(
            r#"
            SELECT tq.id, tq.test_id, tq.question_id, tq.display_order, tq.options,
                   tq.user_answer, tq.is_correct,
                   q.question_text, q.correct_answer, q.ease AS question_ease
            FROM test_questions tq
            JOIN questions q ON q.id = tq.question_id
            WHERE tq.test_id = $1
            ORDER BY tq.display_order
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Score a test and update performance records in one transaction.
    ///
    /// The test row is locked for the duration so concurrent submissions
    /// serialize; either every TestQuestion and performance row is updated
    /// or none.
    pub async fn submit_test(
        &self,
        scheduler: &Scheduler,
        test_id: i64,
        user_id: Uuid,
        answers: &HashMap<i64, SubmittedAnswer>,
    ) -> Result<SubmissionOutcome> {
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, DbTest>(
            r#"
            SELECT id, user_id, category_id, is_practice, score, completed, created_at
            FROM tests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(test_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("test {test_id}")))?;

        if test.user_id != user_id {
            return Err(ApiError::NotFound(format!("test {test_id}")));
        }
        if test.completed {
            return Err(ApiError::AlreadySubmitted(format!(
                "test {test_id} is already scored"
            )));
        }

        let questions = sqlx::query_as::<_, TestQuestionRow>(
            r#"
            SELECT tq.id, tq.test_id, tq.question_id, tq.display_order, tq.options,
                   tq.user_answer, tq.is_correct,
                   q.question_text, q.correct_answer, q.ease AS question_ease
            FROM test_questions tq
            JOIN questions q ON q.id = tq.question_id
            WHERE tq.test_id = $1
            ORDER BY tq.display_order
            "#,
        )
        .bind(test_id)
        .fetch_all(&mut *tx)
        .await?;

        for question in &questions {
            if !answers.contains_key(&question.question_id) {
                return Err(ApiError::IncompleteSubmission(format!(
                    "question {} has no answer",
                    question.question_id
                )));
            }
        }

        let now = Utc::now();
        let mut correct_count = 0;
        let mut results = Vec::with_capacity(questions.len());

        for question in &questions {
            let submitted = &answers[&question.question_id];
            let is_correct = scoring::grade(&question.correct_answer, submitted.answer.as_deref());
            if is_correct {
                correct_count += 1;
            }

            sqlx::query(
                r#"
                UPDATE test_questions
                SET user_answer = $1, is_correct = $2
                WHERE id = $3
                "#,
            )
            .bind(&submitted.answer)
            .bind(is_correct)
            .bind(question.id)
            .execute(&mut *tx)
            .await?;

            Self::apply_attempt(
                &mut tx,
                scheduler,
                user_id,
                question.question_id,
                question.question_ease,
                is_correct,
                submitted.time_secs,
                now,
            )
            .await?;

            results.push(QuestionResult {
                question_id: question.question_id,
                correct: is_correct,
                correct_answer: question.correct_answer.clone(),
                user_answer: submitted.answer.clone(),
            });
        }

        let score = scoring::score_percentage(correct_count, questions.len());

        sqlx::query(
            r#"
            UPDATE tests
            SET score = $1, completed = TRUE
            WHERE id = $2
            "#,
        )
        .bind(score)
        .bind(test_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubmissionOutcome {
            score,
            correct_count,
            total_questions: questions.len(),
            is_practice: test.is_practice,
            results,
        })
    }

    /// Apply one attempt to a performance record within a transaction.
    ///
    /// A zero-attempt seed row is inserted first (the question's own ease
    /// carries into it), so the FOR UPDATE read always finds a row to lock
    /// and concurrent first attempts for the same (user, question)
    /// serialize instead of overwriting each other.
    #[allow(clippy::too_many_arguments)]
    async fn apply_attempt(
        tx: &mut Transaction<'_, Postgres>,
        scheduler: &Scheduler,
        user_id: Uuid,
        question_id: i64,
        question_ease: f64,
        correct: bool,
        response_secs: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO performance (user_id, question_id, ease, next_review)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, question_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(question_ease)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        let record = sqlx::query_as::<_, DbPerformance>(
            r#"
            SELECT user_id, question_id, attempts, correct_count, streak, ease,
                   avg_response_secs, next_review, created_at, updated_at
            FROM performance
            WHERE user_id = $1 AND question_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_one(&mut **tx)
        .await?;

        let outcome = scheduler.review(&record.to_review_state(), correct, response_secs, now);
        let new_state = outcome.new_state;

        sqlx::query(
            r#"
            UPDATE performance
            SET attempts = $3, correct_count = $4, streak = $5, ease = $6,
                avg_response_secs = $7, next_review = $8, updated_at = NOW()
            WHERE user_id = $1 AND question_id = $2
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(new_state.attempts as i32)
        .bind(new_state.correct_count as i32)
        .bind(new_state.streak as i32)
        .bind(new_state.ease)
        .bind(new_state.avg_response_secs)
        .bind(outcome.next_review)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // === Performance Repository ===

    /// Get a user's performance records joined with question info
    pub async fn get_user_performance(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
    ) -> Result<Vec<PerformanceRow>> {
        let rows = match category_id {
            Some(category) => {
                sqlx::query_as::<_, PerformanceRow>(
                    r#"
                    SELECT p.question_id, q.question_text, c.name AS category,
                           p.attempts, p.correct_count, p.ease, p.avg_response_secs, p.next_review
                    FROM performance p
                    JOIN questions q ON q.id = p.question_id
                    JOIN categories c ON c.id = q.category_id
                    WHERE p.user_id = $1 AND q.category_id = $2
                    "#,
                )
                .bind(user_id)
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PerformanceRow>(
                    r#"
                    SELECT p.question_id, q.question_text, c.name AS category,
                           p.attempts, p.correct_count, p.ease, p.avg_response_secs, p.next_review
                    FROM performance p
                    JOIN questions q ON q.id = p.question_id
                    JOIN categories c ON c.id = q.category_id
                    WHERE p.user_id = $1
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Get one performance record
    pub async fn get_performance(
        &self,
        user_id: Uuid,
        question_id: i64,
    ) -> Result<Option<DbPerformance>> {
        let record = sqlx::query_as::<_, DbPerformance>(
            r#"
            SELECT user_id, question_id, attempts, correct_count, streak, ease,
                   avg_response_secs, next_review, created_at, updated_at
            FROM performance
            WHERE user_id = $1 AND question_id = $2
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    // === Timer Repository ===

    /// Start a timer; the partial unique index rejects a second active one
    pub async fn start_timer(
        &self,
        user_id: Uuid,
        category_id: Option<i64>,
        study_session_id: Option<i64>,
    ) -> Result<TimerSession> {
        let timer = sqlx::query_as::<_, TimerSession>(
            r#"
            INSERT INTO timer_sessions (id, user_id, category_id, study_session_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, category_id, study_session_id, started_at, stopped_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(category_id)
        .bind(study_session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::TimerState("a timer is already running for this user".to_string())
            }
            _ => ApiError::Database(e),
        })?;

        Ok(timer)
    }

    /// Stop a running timer
    pub async fn stop_timer(&self, timer_id: Uuid, user_id: Uuid) -> Result<TimerSession> {
        let timer = sqlx::query_as::<_, TimerSession>(
            r#"
            UPDATE timer_sessions
            SET stopped_at = NOW()
            WHERE id = $1 AND user_id = $2 AND stopped_at IS NULL
            RETURNING id, user_id, category_id, study_session_id, started_at, stopped_at
            "#,
        )
        .bind(timer_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::TimerState(format!("no running timer {timer_id}")))?;

        Ok(timer)
    }

    // === Study Session Repository ===

    /// Schedule a study session
    pub async fn create_study_session(
        &self,
        user_id: Uuid,
        request: &CreateStudySessionRequest,
    ) -> Result<StudySession> {
        let session = sqlx::query_as::<_, StudySession>(
            r#"
            INSERT INTO study_sessions (user_id, category_id, starts_at, duration_minutes, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, category_id, starts_at, duration_minutes, description, created_at
            "#,
        )
        .bind(user_id)
        .bind(request.category_id)
        .bind(request.starts_at)
        .bind(request.duration_minutes)
        .bind(&request.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// List a user's scheduled study sessions
    pub async fn list_study_sessions(&self, user_id: Uuid) -> Result<Vec<StudySession>> {
        let sessions = sqlx::query_as::<_, StudySession>(
            r#"
            SELECT id, user_id, category_id, starts_at, duration_minutes, description, created_at
            FROM study_sessions
            WHERE user_id = $1
            ORDER BY starts_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Get a study session by id
    pub async fn get_study_session(&self, session_id: i64) -> Result<Option<StudySession>> {
        let session = sqlx::query_as::<_, StudySession>(
            r#"
            SELECT id, user_id, category_id, starts_at, duration_minutes, description, created_at
            FROM study_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    // === Dashboard Repository ===

    /// Overall attempt totals for a user
    pub async fn get_dashboard_summary(&self, user_id: Uuid) -> Result<DashboardSummaryResponse> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*)::INT8 AS total_questions,
                   COALESCE(SUM(attempts), 0)::INT8 AS total_attempts,
                   COALESCE(SUM(correct_count), 0)::INT8 AS total_correct
            FROM performance
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let total_questions: i64 = row.get("total_questions");
        let total_attempts: i64 = row.get("total_attempts");
        let total_correct: i64 = row.get("total_correct");

        Ok(DashboardSummaryResponse {
            total_questions,
            total_attempts,
            accuracy: quiz_core::stats::accuracy(total_correct as u32, total_attempts as u32),
        })
    }

    /// Per-category accuracy, response time and ease
    pub async fn get_category_stats(&self, user_id: Uuid) -> Result<Vec<CategoryStat>> {
        let stats = sqlx::query_as::<_, CategoryStat>(
            r#"
            SELECT c.name,
                   COALESCE(SUM(p.correct_count)::FLOAT8 / NULLIF(SUM(p.attempts), 0) * 100.0, 0)::FLOAT8 AS accuracy,
                   COALESCE(AVG(p.avg_response_secs), 0)::FLOAT8 AS avg_response_time,
                   COALESCE(AVG(p.ease), 0)::FLOAT8 AS avg_ease
            FROM performance p
            JOIN questions q ON q.id = p.question_id
            JOIN categories c ON c.id = q.category_id
            WHERE p.user_id = $1
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Per-day rollup of tests, study time and questions practiced
    pub async fn get_daily_progress(&self, user_id: Uuid, days: u32) -> Result<Vec<DailyProgress>> {
        let since = Utc::now() - Duration::days(days as i64);

        let test_rows = sqlx::query(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*)::INT8 AS tests_taken,
                   COALESCE(AVG(score), 0)::FLOAT8 AS avg_score
            FROM tests
            WHERE user_id = $1 AND completed AND created_at >= $2
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let timer_rows = sqlx::query(
            r#"
            SELECT started_at::date AS day,
                   SUM(EXTRACT(EPOCH FROM (stopped_at - started_at)))::FLOAT8 AS study_secs
            FROM timer_sessions
            WHERE user_id = $1 AND stopped_at IS NOT NULL AND started_at >= $2
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let question_rows = sqlx::query(
            r#"
            SELECT t.created_at::date AS day,
                   COUNT(tq.id)::INT8 AS questions
            FROM test_questions tq
            JOIN tests t ON t.id = tq.test_id
            WHERE t.user_id = $1 AND t.completed AND t.created_at >= $2
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut tests_by_day: HashMap<NaiveDate, (i64, f64)> = HashMap::new();
        for row in test_rows {
            tests_by_day.insert(row.get("day"), (row.get("tests_taken"), row.get("avg_score")));
        }
        let mut study_by_day: HashMap<NaiveDate, f64> = HashMap::new();
        for row in timer_rows {
            study_by_day.insert(row.get("day"), row.get("study_secs"));
        }
        let mut questions_by_day: HashMap<NaiveDate, i64> = HashMap::new();
        for row in question_rows {
            questions_by_day.insert(row.get("day"), row.get("questions"));
        }

        let today = Utc::now().date_naive();
        let mut progress = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = today - Duration::days(offset as i64);
            let (tests_taken, avg_score) = tests_by_day.get(&date).copied().unwrap_or((0, 0.0));
            progress.push(DailyProgress {
                date,
                tests_taken,
                avg_score,
                study_time: study_by_day.get(&date).copied().unwrap_or(0.0),
                questions_practiced: questions_by_day.get(&date).copied().unwrap_or(0),
            });
        }

        Ok(progress)
    }
}
