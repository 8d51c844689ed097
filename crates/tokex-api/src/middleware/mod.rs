//! # Middleware
//!
//! - `metrics`: per-request counters and latency histogram.
//! - `tracing_layer`: request spans via `tower_http::trace`.

pub mod metrics;
pub mod tracing_layer;
