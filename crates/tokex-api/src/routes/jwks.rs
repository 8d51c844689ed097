//! # Verification Key Set API
//!
//! Serves the cached JWKS document. Relying parties may cache it for an
//! hour and fetch it cross-origin.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// `Cache-Control` value on JWKS responses.
pub const JWKS_CACHE_CONTROL: &str = "public, max-age=3600, must-revalidate";

/// Build the JWKS router.
pub fn router() -> Router<AppState> {
    Router::new().route("/.well-known/jwks.json", get(jwks))
}

/// GET /.well-known/jwks.json — Publish the verification key set.
#[utoipa::path(
    get,
    path = "/.well-known/jwks.json",
    responses(
        (status = 200, description = "JSON Web Key Set with exactly one key", content_type = "application/json"),
    ),
    tag = "keys"
)]
pub(crate) async fn jwks(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, JWKS_CACHE_CONTROL),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        state.jwks.document_json().to_owned(),
    )
}
