//! Liveness and readiness endpoint tests.
//!
//! `/healthz` must answer without touching storage; `/readyz` must reflect
//! the availability of both stores.

use std::time::Duration;

use axum::{http::StatusCode, Router};
use ostrich_api::{create_router, AppState, IngestConfig};
use ostrich_testing::{
    fixtures::get,
    http::{body_json, body_text},
    TestEnv,
};
use tower::ServiceExt;

fn app(env: &TestEnv) -> Router {
    create_router(AppState::with_clock(env.storage(), env.clock()))
}

#[tokio::test]
async fn liveness_answers_ok() {
    let env = TestEnv::new();

    let response = app(&env).oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn liveness_ignores_store_outages() {
    let env = TestEnv::new();
    env.fail_audit_log().await;
    env.fail_queue().await;

    let response = app(&env).oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_reports_both_stores_up() {
    let env = TestEnv::new();

    let response = app(&env).oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["status"], "healthy");
    assert_eq!(report["timestamp"], "2017-06-01T12:00:00Z");
    assert_eq!(report["checks"]["document_store"]["status"], "up");
    assert_eq!(report["checks"]["key_value_store"]["status"], "up");
    assert!(report["checks"]["document_store"].get("message").is_none());
}

#[tokio::test]
async fn readiness_fails_when_document_store_is_down() {
    let env = TestEnv::new();
    env.fail_audit_log().await;

    let response = app(&env).oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let report = body_json(response).await;
    assert_eq!(report["status"], "unhealthy");
    assert_eq!(report["checks"]["document_store"]["status"], "down");
    assert_eq!(report["checks"]["key_value_store"]["status"], "up");
}

#[tokio::test]
async fn readiness_fails_when_key_value_store_is_down() {
    let env = TestEnv::new();
    env.fail_queue().await;

    let response = app(&env).oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let report = body_json(response).await;
    insta::assert_snapshot!(
        report["checks"]["key_value_store"]["message"].as_str().unwrap(),
        @"[E3002] Queue unavailable: key-value store unreachable"
    );
}

#[tokio::test(start_paused = true)]
async fn readiness_treats_a_hung_store_as_down() {
    let env = TestEnv::new();
    env.mocks.triggers_log.set_delay(Duration::from_secs(60)).await;
    let app = create_router(AppState::with_clock(env.storage(), env.clock()).ingest_config(
        IngestConfig {
            audit_timeout: Duration::from_millis(100),
            enqueue_timeout: Duration::from_millis(100),
        },
    ));

    let response = app.oneshot(get("/readyz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let report = body_json(response).await;
    assert_eq!(report["checks"]["document_store"]["message"], "ping timed out after 100ms");
}
