//! Study timer API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Test starting and stopping a timer reports a duration.
#[tokio::test]
#[ignore = "requires database"]
async fn test_timer_start_stop_reports_duration() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let start = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await;

    start.assert_status_ok();
    let body: serde_json::Value = start.json();
    let timer_id = body["timer_id"].as_str().unwrap().to_string();

    let stop = server
        .post(&format!("/api/timers/{}/stop", timer_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    stop.assert_status_ok();
    let body: serde_json::Value = stop.json();
    assert_eq!(body["timer_id"].as_str().unwrap(), timer_id);
    assert!(body["duration_secs"].as_f64().unwrap() >= 0.0);

    ctx.cleanup_user(user_id).await;
}

/// Test that a second timer cannot start while one is running.
#[tokio::test]
#[ignore = "requires database"]
async fn test_second_timer_rejected_while_running() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let first = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await;
    first.assert_status_ok();

    let second = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await;

    second.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = second.json();
    assert_eq!(body["error"], "timer_state");

    ctx.cleanup_user(user_id).await;
}

/// Test that stopping a timer twice is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_stopping_a_stopped_timer_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let start: serde_json::Value = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await
        .json();
    let timer_id = start["timer_id"].as_str().unwrap().to_string();

    let stop = server
        .post(&format!("/api/timers/{}/stop", timer_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    stop.assert_status_ok();

    let again = server
        .post(&format!("/api/timers/{}/stop", timer_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    again.assert_status(StatusCode::CONFLICT);

    ctx.cleanup_user(user_id).await;
}

/// Test that a stopped timer frees the user to start a new one.
#[tokio::test]
#[ignore = "requires database"]
async fn test_new_timer_allowed_after_stop() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let first: serde_json::Value = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await
        .json();
    let timer_id = first["timer_id"].as_str().unwrap().to_string();

    server
        .post(&format!("/api/timers/{}/stop", timer_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await
        .assert_status_ok();

    let second = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({}))
        .await;

    second.assert_status_ok();

    ctx.cleanup_user(user_id).await;
}

/// Test that a timer can attach to a scheduled study session.
#[tokio::test]
#[ignore = "requires database"]
async fn test_timer_attaches_to_study_session() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(None).await;

    let category = fixtures::seed_category(ctx.db.as_ref(), "timer-sessions").await;

    let session: serde_json::Value = server
        .post("/api/study-sessions")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::study_session_request(category.id, 30))
        .await
        .json();
    let session_id = session["id"].as_i64().unwrap();

    let start = server
        .post("/api/timers")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&serde_json::json!({
            "category_id": category.id,
            "study_session_id": session_id
        }))
        .await;

    start.assert_status_ok();

    ctx.cleanup_user(user_id).await;
    ctx.cleanup_category(category.id).await;
}
