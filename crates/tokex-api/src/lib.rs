//! # tokex-api — Axum Service for the Token Exchange
//!
//! Exchanges a long-lived API key for a short-lived signed token asserting
//! the owning organization, and publishes the key set relying parties use
//! to verify those tokens.
//!
//! ## API Surface
//!
//! | Route                     | Module               | Purpose |
//! |---------------------------|----------------------|---------|
//! | `POST /token`             | [`routes::token`]    | API key → organization token |
//! | `GET /.well-known/jwks.json` | [`routes::jwks`]  | verification key set |
//! | `GET /health`             | this module          | liveness |
//! | `GET /metrics`            | [`routes::metrics`]  | Prometheus exposition |
//! | `GET /openapi.json`       | [`openapi`]          | OpenAPI document |
//!
//! A known route called with the wrong method answers `405` with the JSON
//! error envelope.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod bootstrap;
pub mod error;
pub mod exchange;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::http::{Method, Uri};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::token::router())
        .merge(routes::jwks::router())
        .merge(routes::metrics::router())
        .merge(openapi::router())
        .route("/health", get(health))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// GET /health — Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is serving", body = String, content_type = "text/plain"),
    ),
    tag = "health"
)]
pub(crate) async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{method} {}", uri.path()))
}
