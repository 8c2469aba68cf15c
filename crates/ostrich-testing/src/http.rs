//! Response helpers.

use axum::{body::to_bytes, response::Response};
use bytes::Bytes;
use serde_json::Value;

/// Reads the whole response body.
///
/// # Panics
///
/// Panics if the body stream fails.
pub async fn body_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.expect("failed to read response body")
}

/// Reads the response body as UTF-8 text.
///
/// # Panics
///
/// Panics if the body is not UTF-8.
pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("response body should be UTF-8")
}

/// Reads the response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body should be JSON")
}
