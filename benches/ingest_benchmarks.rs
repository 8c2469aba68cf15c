//! Performance benchmarks for trigger ingestion.
//!
//! Runs the full router against mock stores, so the numbers cover request
//! handling, body parsing, and serialization but no store round trips.

use std::{hint::black_box, time::Duration};

use criterion::{
    criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use ostrich_api::{create_router, AppState};
use ostrich_core::parse_body;
use ostrich_testing::{TestEnv, TriggerRequestBuilder};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tower::ServiceExt;

/// Builds a JSON body of roughly `size` bytes.
fn generate_payload(size: usize) -> Value {
    json!({
        "job": "build",
        "ref": "refs/heads/main",
        "padding": "x".repeat(size),
    })
}

/// Benchmarks `POST /trigger` end to end for several body sizes.
fn bench_trigger_ingestion(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("ingestion");
    group.measurement_time(Duration::from_secs(10));

    for payload_size in [100, 1000, 10_000, 100_000] {
        let payload = generate_payload(payload_size);
        group.throughput(Throughput::Bytes(payload.to_string().len() as u64));

        group.bench_with_input(
            BenchmarkId::new("payload_size", payload_size),
            &payload,
            |b, payload| {
                // Fresh stores per iteration so the mock log does not grow unbounded.
                b.to_async(&rt).iter_batched(
                    || {
                        let env = TestEnv::new();
                        let app = create_router(AppState::with_clock(env.storage(), env.clock()));
                        (app, TriggerRequestBuilder::json(payload).build())
                    },
                    |(app, request)| async move { black_box(app.oneshot(request).await.unwrap()) },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmarks body parsing on valid and invalid input.
fn bench_body_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_body");

    let valid = generate_payload(1000).to_string().into_bytes();
    let invalid = b"{\"job\": \"build\", \"ref\": ".to_vec();

    group.bench_function("valid_json", |b| b.iter(|| black_box(parse_body(black_box(&valid)))));
    group.bench_function("invalid_json", |b| b.iter(|| black_box(parse_body(black_box(&invalid)))));

    group.finish();
}

criterion_group!(benches, bench_trigger_ingestion, bench_body_parsing);
criterion_main!(benches);
