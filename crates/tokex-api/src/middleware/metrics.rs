//! # Request Metrics
//!
//! Records `tokex_http_requests_total{status}` and
//! `tokex_http_request_duration_seconds` through the `metrics` facade. When
//! no recorder is installed (tests, embedding) the calls are no-ops.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Name of the request counter.
pub const HTTP_REQUESTS_METRIC: &str = "tokex_http_requests_total";

/// Name of the request latency histogram.
pub const HTTP_DURATION_METRIC: &str = "tokex_http_request_duration_seconds";

/// Latency buckets in seconds.
pub const HTTP_DURATION_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Middleware that counts requests by status and records their latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(HTTP_REQUESTS_METRIC, "status" => status).increment(1);
    metrics::histogram!(HTTP_DURATION_METRIC).record(start.elapsed().as_secs_f64());

    response
}
