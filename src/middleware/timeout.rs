use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

use crate::error::AppError;

/// Bounds each request by the configured timeout
///
/// When the deadline passes the inner future is dropped, which cancels any
/// in-flight catalog queries along with the snapshot transaction. The client
/// gets a JSON 408 and never a partial page.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis(), "Request timed out");
            AppError::Timeout(limit.as_millis()).into_response()
        }
    }
}
