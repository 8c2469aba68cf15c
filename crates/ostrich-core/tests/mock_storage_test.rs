//! Tests for the in-memory storage doubles.
//!
//! The HTTP tests lean on these mocks to simulate outages and slow
//! backends, so their fault injection has to behave like the real stores.

use std::time::Duration;

use chrono::Utc;
use ostrich_core::{
    storage::{mock::MockStorage, AuditLog, TriggerQueue, ViewCounter},
    OstrichError, TriggerEvent, TriggerHeaders,
};
use serde_json::{json, Value};

fn trigger(body: Value) -> TriggerEvent {
    TriggerEvent::from_api(Utc::now(), TriggerHeaders::new(), body)
}

#[tokio::test]
async fn audit_log_assigns_unique_ids_in_append_order() {
    let mocks = MockStorage::new();
    let storage = mocks.storage();

    let first = storage.triggers_log.record(trigger(json!({"n": 1}))).await.unwrap();
    let second = storage.triggers_log.record(trigger(json!({"n": 2}))).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(mocks.triggers_log.bodies().await, vec![json!({"n": 1}), json!({"n": 2})]);

    let records = mocks.triggers_log.records().await;
    assert_eq!(records[0].0, first);
    assert_eq!(records[1].0, second);
}

#[tokio::test]
async fn unavailable_audit_log_rejects_writes() {
    let mocks = MockStorage::new();
    mocks.triggers_log.set_unavailable("connection refused").await;

    let result = mocks.storage().triggers_log.record(trigger(Value::Null)).await;

    assert!(matches!(
        result,
        Err(OstrichError::StorageUnavailable(reason)) if reason == "connection refused"
    ));
    assert!(mocks.triggers_log.is_empty().await);

    mocks.triggers_log.set_available().await;
    assert!(mocks.storage().triggers_log.record(trigger(Value::Null)).await.is_ok());
}

#[tokio::test]
async fn queue_stores_encoded_entries() {
    let mocks = MockStorage::new();
    let queue = mocks.storage().triggers_queue;

    queue.enqueue(json!({"job": "deploy"})).await.unwrap();
    queue.enqueue(Value::Null).await.unwrap();

    assert_eq!(mocks.triggers_queue.entries().await, vec![r#"{"job":"deploy"}"#, "null"]);
    assert_eq!(
        mocks.triggers_queue.decoded().await.unwrap(),
        vec![json!({"job": "deploy"}), Value::Null]
    );
}

#[tokio::test]
async fn unavailable_queue_rejects_pushes_and_pings() {
    let mocks = MockStorage::new();
    mocks.triggers_queue.set_unavailable("redis down").await;
    let queue = mocks.storage().triggers_queue;

    assert!(matches!(queue.enqueue(json!(1)).await, Err(OstrichError::QueueUnavailable(_))));
    assert!(matches!(queue.ping().await, Err(OstrichError::QueueUnavailable(_))));
    assert!(mocks.triggers_queue.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn injected_delay_holds_the_operation() {
    let mocks = MockStorage::new();
    mocks.triggers_log.set_delay(Duration::from_secs(10)).await;
    let log = mocks.storage().triggers_log;

    let timed_out =
        tokio::time::timeout(Duration::from_secs(1), log.record(trigger(Value::Null))).await;

    assert!(timed_out.is_err());
    assert!(mocks.triggers_log.is_empty().await);
}

#[tokio::test]
async fn view_counter_counts_from_one() {
    let mocks = MockStorage::new();
    let counter = mocks.storage().view_counter;

    assert_eq!(counter.increment().await.unwrap(), 1);
    assert_eq!(counter.increment().await.unwrap(), 2);
    assert_eq!(mocks.view_counter.current(), 2);
}

#[tokio::test]
async fn view_counter_has_no_lost_updates_under_concurrency() {
    let mocks = MockStorage::new();
    let storage = mocks.storage();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let counter = storage.view_counter.clone();
            tokio::spawn(async move { counter.increment().await.unwrap() })
        })
        .collect();

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    seen.sort_unstable();

    assert_eq!(seen, (1..=50).collect::<Vec<i64>>());
}

#[tokio::test]
async fn unavailable_counter_reports_counter_error() {
    let mocks = MockStorage::new();
    mocks.view_counter.set_unavailable("redis down").await;

    let result = mocks.storage().view_counter.increment().await;

    assert!(matches!(result, Err(OstrichError::CounterUnavailable(_))));
    assert_eq!(mocks.view_counter.current(), 0);
}
