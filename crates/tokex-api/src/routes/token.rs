//! # Token Exchange API
//!
//! `POST /token` with `{"api_key": "..."}` returns `{"token": "..."}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Exchange request.
#[derive(Deserialize, ToSchema)]
pub struct ExchangeRequest {
    /// The caller's long-lived API key.
    pub api_key: String,
}

/// Exchange response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeResponse {
    /// Compact JWS, valid for one hour.
    pub token: String,
}

/// Build the token router.
pub fn router() -> Router<AppState> {
    Router::new().route("/token", post(exchange_token))
}

/// POST /token — Exchange an API key for an organization token.
#[utoipa::path(
    post,
    path = "/token",
    description = "Exchange an API key for a compact EdDSA JWT asserting the owning organization. \
        The token is valid for one hour. `iat`, `nbf` and `exp` are whole seconds, so two tokens \
        minted within the same second carry identical expiry claims and differ only in `jti`.",
    request_body = ExchangeRequest,
    responses(
        (status = 200, description = "Signed organization token", body = ExchangeResponse),
        (status = 400, description = "Missing or malformed request body", body = ErrorBody),
        (status = 401, description = "API key not accepted", body = ErrorBody),
        (status = 405, description = "Method other than POST", body = ErrorBody),
        (status = 500, description = "Credential store or signing failure", body = ErrorBody),
    ),
    tag = "exchange"
)]
pub(crate) async fn exchange_token(
    State(state): State<AppState>,
    body: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<Json<ExchangeResponse>, AppError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return Err(state.exchange.reject_malformed(rejection.body_text()).into()),
    };
    let token = state.exchange.exchange(&request.api_key).await?;
    Ok(Json(ExchangeResponse {
        token: token.into_compact(),
    }))
}
