//! Root page view counter.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, instrument};

use super::error_response;
use crate::state::AppState;

/// Increments the view counter and greets with the new count.
///
/// The count shown is the value returned by the increment itself, so two
/// concurrent visitors never see the same number.
#[instrument(name = "count_view", skip(state))]
pub async fn count_view(State(state): State<AppState>) -> Response {
    match state.storage.view_counter.increment().await {
        Ok(count) => {
            debug!(views = count, "Page viewed");
            format!("Hello! This page has been seen {count} times.").into_response()
        },
        Err(e) => {
            error!(code = e.code(), error = %e, "View counter increment failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        },
    }
}
