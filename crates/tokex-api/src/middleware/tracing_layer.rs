//! # Request/Response Tracing
//!
//! Configures `tower_http::trace::TraceLayer` for per-request spans.
//! Server errors are reported at `DEBUG`; the exchange orchestrator owns the
//! `ERROR` line for each failed exchange.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnFailure, TraceLayer};
use tracing::Level;

/// Build the `TraceLayer` for the token exchange router.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_constructs_without_panic() {
        let _layer = layer();
    }
}
