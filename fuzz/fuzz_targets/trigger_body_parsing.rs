#![no_main]

//! Fuzz target for trigger body handling.
//!
//! Arbitrary bytes go through the same steps as a `POST /trigger` body:
//! parse, fall back to null, encode for the queue, decode as a worker
//! would. None of it may panic, and the decoded entry must equal the
//! parsed body.

use libfuzzer_sys::fuzz_target;
use ostrich_core::{capture_headers, parse_body, storage::triggers_queue::encode_payload};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let body = parse_body(data).unwrap_or(Value::Null);

    let queued = encode_payload(&body);
    let decoded = parse_body(queued.as_bytes()).expect("queued entries are valid JSON");
    assert_eq!(decoded, body);

    let split = data.len() / 2;
    let headers = capture_headers([("x-fuzz", &data[..split]), ("x-fuzz", &data[split..])]);
    assert_eq!(headers.len(), 1);
    assert!(headers.contains_key("X-Fuzz"));
});

