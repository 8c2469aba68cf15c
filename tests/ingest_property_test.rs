//! Property-based tests for the ingestion pipeline.
//!
//! Posts randomly generated trigger sequences through the full router and
//! checks the pipeline invariants: every queued body has an audit record,
//! queue order matches request order, and what a worker pops decodes to
//! exactly what the caller sent.

use ostrich_api::{create_router, AppState};
use ostrich_testing::{TestEnv, TriggerRequestBuilder};
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use serde_json::Value;
use tokio::runtime::Runtime;
use tower::ServiceExt;

/// Creates property test configuration based on environment.
///
/// `PROPTEST_CASES` overrides the default case count.
fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(32);

    ProptestConfig { cases, failure_persistence: None, ..ProptestConfig::default() }
}

fn body_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Raw request bodies: valid JSON, or arbitrary bytes that may not parse.
#[derive(Debug, Clone)]
enum RawBody {
    Json(Value),
    Bytes(Vec<u8>),
}

impl RawBody {
    fn encoded(&self) -> Vec<u8> {
        match self {
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }

    fn expected(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Bytes(bytes) => serde_json::from_slice(bytes).unwrap_or(Value::Null),
        }
    }
}

fn raw_body_strategy() -> impl Strategy<Value = RawBody> {
    prop_oneof![
        3 => body_strategy().prop_map(RawBody::Json),
        1 => prop::collection::vec(any::<u8>(), 0..32).prop_map(RawBody::Bytes),
    ]
}

fn post_all(bodies: &[RawBody]) -> (Vec<Value>, Vec<Value>) {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let env = TestEnv::new();
        let app = create_router(AppState::with_clock(env.storage(), env.clock()));

        for body in bodies {
            let response = app
                .clone()
                .oneshot(TriggerRequestBuilder::json_text(body.encoded()).build())
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
        }

        (env.audited_bodies().await, env.queued_bodies().await.unwrap())
    })
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn queue_mirrors_audit_log_in_request_order(
        bodies in prop::collection::vec(raw_body_strategy(), 1..12)
    ) {
        let (audited, queued) = post_all(&bodies);
        let expected: Vec<Value> = bodies.iter().map(RawBody::expected).collect();

        prop_assert_eq!(&audited, &expected);
        prop_assert_eq!(&queued, &expected);
    }
}
