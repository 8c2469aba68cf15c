//! Trigger ingestion endpoint.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{error, info, instrument};

use super::error_response;
use crate::{
    ingest::{extract_headers, TriggerIngestor},
    state::AppState,
};

/// Accepts a trigger, audits it, and queues its body.
///
/// The body is parsed only under a JSON `Content-Type`; anything else,
/// malformed, or absent is kept as `null`. It is never rejected. Responds `200 OK` with the text `OK` once both writes succeed.
///
/// # Errors
///
/// Returns `500` with a JSON error body when either store fails:
/// - `E3001`: audit not confirmed, nothing queued
/// - `E3002`: audited, enqueue not confirmed
#[instrument(
    name = "receive_trigger",
    skip(state, headers, body),
    fields(
        content_length = body.len(),
        content_type = headers.get("content-type").and_then(|v| v.to_str().ok()).unwrap_or("none"),
    )
)]
pub async fn receive_trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ingestor = TriggerIngestor::from_state(&state);

    match ingestor.ingest(extract_headers(&headers), &body).await {
        Ok(record_id) => {
            info!(record_id = %record_id, "Trigger accepted");
            (StatusCode::OK, "OK").into_response()
        },
        Err(e) => {
            error!(code = e.code(), error = %e, "Trigger ingestion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        },
    }
}
