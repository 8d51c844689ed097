//! # API Route Modules
//!
//! - `token` — API-key to organization-token exchange (`POST /token`).
//! - `jwks` — verification key set (`GET /.well-known/jwks.json`).
//! - `metrics` — Prometheus exposition (`GET /metrics`).

pub mod jwks;
pub mod metrics;
pub mod token;
