//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the public API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Token Exchange API",
        version = "0.1.0",
        description = "Exchanges long-lived API keys for short-lived organization tokens and publishes the verification key set.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::token::exchange_token,
        crate::routes::jwks::jwks,
        crate::health,
    ),
    components(schemas(
        crate::routes::token::ExchangeRequest,
        crate::routes::token::ExchangeResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "exchange", description = "API key to token exchange"),
        (name = "keys", description = "Token verification keys"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
