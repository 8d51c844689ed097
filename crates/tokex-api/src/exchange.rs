//! # Exchange Orchestration
//!
//! Turns an API key into a signed organization token.
//!
//! ## Request States
//!
//! ```text
//! Received ──▶ Verifying ──▶ Issuing ──▶ Succeeded
//!    │             │            │
//!    ▼             ├──▶ Rejected │
//! Rejected         └──▶ Failed ◀─┘
//! ```
//!
//! | Failure | Terminal state | Error |
//! |---------|----------------|-------|
//! | body missing or unparseable | Rejected | [`ExchangeError::MalformedRequest`] |
//! | key unknown | Rejected | [`ExchangeError::InvalidCredential`] |
//! | store unreachable, erroring, or timed out | Failed | [`ExchangeError::StoreUnavailable`] |
//! | signing error | Failed | [`ExchangeError::SigningFailure`] |
//!
//! One lookup and at most one token per request. Nothing is retried: each
//! caller retry performs a fresh lookup and mints a fresh token. Neither the
//! API key nor the compact token is ever logged.

use std::sync::Arc;

use tokex_crypto::{IssuedToken, SigningError, TokenIssuer};
use tokex_store::{BackendError, CredentialError, CredentialStore};

/// Name of the exchange outcome counter.
pub const EXCHANGE_OUTCOME_METRIC: &str = "tokex_exchange_total";

/// Lifecycle state of a single exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Received,
    Verifying,
    Issuing,
    Succeeded,
    Rejected,
    Failed,
}

impl ExchangeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Verifying => "verifying",
            Self::Issuing => "issuing",
            Self::Succeeded => "succeeded",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// Whether the request has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Rejected | Self::Failed)
    }
}

impl std::fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an exchange did not produce a token.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("invalid credential")]
    InvalidCredential,

    #[error("credential store unavailable: {0}")]
    StoreUnavailable(#[source] BackendError),

    #[error("token signing failed: {0}")]
    SigningFailure(#[source] SigningError),
}

impl ExchangeError {
    /// The terminal state this error leaves the request in.
    pub fn terminal_state(&self) -> ExchangeState {
        match self {
            Self::MalformedRequest(_) | Self::InvalidCredential => ExchangeState::Rejected,
            Self::StoreUnavailable(_) | Self::SigningFailure(_) => ExchangeState::Failed,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::InvalidCredential => "invalid_credential",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::SigningFailure(_) => "signing_failure",
        }
    }
}

impl From<CredentialError> for ExchangeError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredential => Self::InvalidCredential,
            CredentialError::StoreUnavailable(source) => Self::StoreUnavailable(source),
        }
    }
}

/// Orchestrates credential resolution and token issuance.
#[derive(Debug)]
pub struct ExchangeService {
    store: CredentialStore,
    issuer: Arc<TokenIssuer>,
}

impl ExchangeService {
    pub fn new(store: CredentialStore, issuer: Arc<TokenIssuer>) -> Self {
        Self { store, issuer }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Exchange `api_key` for a token.
    pub async fn exchange(&self, api_key: &str) -> Result<IssuedToken, ExchangeError> {
        tracing::debug!(state = %ExchangeState::Received, "token exchange started");
        let result = self.run(api_key).await;
        match &result {
            Ok(token) => {
                record_outcome(ExchangeState::Succeeded);
                tracing::info!(
                    outcome = %ExchangeState::Succeeded,
                    org = %token.organization_id(),
                    jti = %token.token_id(),
                    kid = %token.key_id(),
                    "token issued"
                );
            }
            Err(err) => self.record_failure(err),
        }
        result
    }

    /// Record a request whose body could not be parsed, and return the
    /// matching error.
    pub fn reject_malformed(&self, detail: impl Into<String>) -> ExchangeError {
        let err = ExchangeError::MalformedRequest(detail.into());
        self.record_failure(&err);
        err
    }

    async fn run(&self, api_key: &str) -> Result<IssuedToken, ExchangeError> {
        tracing::debug!(state = %ExchangeState::Verifying, "resolving credential");
        let org = self.store.resolve_raw(api_key).await?;

        tracing::debug!(state = %ExchangeState::Issuing, org = %org, "issuing token");
        self.issuer
            .issue(&org)
            .map_err(ExchangeError::SigningFailure)
    }

    fn record_failure(&self, err: &ExchangeError) {
        let state = err.terminal_state();
        record_outcome(state);
        match state {
            ExchangeState::Failed => tracing::error!(
                outcome = %state,
                reason = err.reason(),
                error = %err,
                "token exchange failed"
            ),
            _ => tracing::info!(
                outcome = %state,
                reason = err.reason(),
                "token exchange rejected"
            ),
        }
    }
}

fn record_outcome(state: ExchangeState) {
    metrics::counter!(EXCHANGE_OUTCOME_METRIC, "outcome" => state.as_str()).increment(1);
}
