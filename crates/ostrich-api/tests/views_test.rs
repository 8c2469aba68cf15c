//! View counter endpoint tests.

use axum::{http::StatusCode, Router};
use ostrich_api::{create_router, AppState};
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
async fn each_visit_reports_the_incremented_count() {
    let env = TestEnv::new();
    let app = app(&env);

    let first = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    insta::assert_snapshot!(body_text(first).await, @"Hello! This page has been seen 1 times.");

    let second = app.oneshot(get("/")).await.unwrap();
    insta::assert_snapshot!(body_text(second).await, @"Hello! This page has been seen 2 times.");
}

#[tokio::test]
async fn concurrent_visits_see_distinct_counts() {
    let env = TestEnv::new();
    let app = app(&env);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { body_text(app.oneshot(get("/")).await.unwrap()).await })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        let text = handle.await.unwrap();
        let count: i64 = text
            .trim_start_matches("Hello! This page has been seen ")
            .trim_end_matches(" times.")
            .parse()
            .unwrap();
        counts.push(count);
    }
    counts.sort_unstable();

    assert_eq!(counts, (1..=20).collect::<Vec<i64>>());
    assert_eq!(env.mocks.view_counter.current(), 20);
}

#[tokio::test]
async fn counter_outage_returns_500() {
    let env = TestEnv::new();
    env.fail_view_counter().await;

    let response = app(&env).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"]["code"], "E3003");
}

#[tokio::test]
async fn view_counter_does_not_touch_trigger_stores() {
    let env = TestEnv::new();

    app(&env).oneshot(get("/")).await.unwrap();

    assert!(env.mocks.triggers_log.is_empty().await);
    assert!(env.mocks.triggers_queue.is_empty().await);
}
