use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::telemetry;

/// Path whose successful requests are not logged (polled by the host's health checker)
pub const HEALTH_PATH: &str = "/health";

/// Whether a finished request should produce a log line
pub fn should_log(path: &str, status: axum::http::StatusCode) -> bool {
    !(path == HEALTH_PATH && status.is_success())
}

/// Middleware that logs one event per request with method, path, status and latency.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    if should_log(&path, status) {
        tracing::info!(
            tag = telemetry::API,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Request handled"
        );
    }

    response
}
