//! # tokex-cli — Token Exchange Operator CLI
//!
//! Offline tooling around the key record and tokens the service works with.
//!
//! ## Subcommands
//!
//! - `keygen` — Generate an Ed25519 private key record
//! - `jwks` — Render the JWKS document the service would publish for a key
//! - `verify` — Verify a token against a JWKS document and print its claims
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed args and
//!   delegate to `tokex-crypto`.
//! - Handlers return `anyhow::Result<u8>`; the value is the process exit code.

pub mod jwks;
pub mod keygen;
pub mod verify;
