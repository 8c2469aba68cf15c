//! HTTP request handlers.
//!
//! - `trigger`: `POST /trigger`, the ingestion entry point
//! - `views`: `GET /`, the page view counter
//! - `health`: `/healthz` liveness and `/readyz` readiness probes
//!
//! Store failures are answered with a JSON error body carrying the stable
//! error code. E3001 means the audit write was not confirmed and nothing
//! was queued; E3002 means the trigger was audited but the enqueue was not
//! confirmed. Both are a 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ostrich_core::OstrichError;
use serde::Serialize;

pub mod health;
pub mod trigger;
pub mod views;

pub use health::{liveness_check, readiness_check};
pub use trigger::receive_trigger;
pub use views::count_view;

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the taxonomy (E1001-E3003)
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

pub(crate) fn error_response(status: StatusCode, error: &OstrichError) -> Response {
    let error_response = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };

    (status, Json(error_response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_status() {
        let error = OstrichError::QueueUnavailable("connection reset".to_string());
        let response = error_response(StatusCode::INTERNAL_SERVER_ERROR, &error);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_layout() {
        let error = OstrichError::StorageUnavailable("pool timed out".to_string());
        let body = ErrorResponse {
            error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
        };

        insta::assert_snapshot!(
            serde_json::to_string(&body).unwrap(),
            @r#"{"error":{"code":"E3001","message":"[E3001] Storage unavailable: pool timed out"}}"#
        );
    }
}
