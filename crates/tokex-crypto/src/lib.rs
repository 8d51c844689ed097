//! # tokex-crypto — Signing Material and Token Issuance
//!
//! Provides the cryptographic half of the token exchange:
//!
//! - **Key material** ([`key_material`]): parses a JSON Web Key record,
//!   validates that it is a private Ed25519 key with a key id, and exposes
//!   an immutable [`SigningKeyPair`].
//! - **Issuance** ([`issuer`]): builds organization claims with a one-hour
//!   validity window and a fresh `jti`, signed as a compact EdDSA JWT whose
//!   header names the signing key.
//! - **Publication** ([`jwks`]): renders the public half as a JWKS document,
//!   computed once and served byte-identically.
//! - **Verification** ([`verify`]): the relying-party check, used by the
//!   CLI and by tests to prove issued tokens verify against the published set.
//!
//! ## Crate Policy
//!
//! - Depends only on `tokex-core` internally.
//! - Private key bytes are never serialized or logged by the service path.
//!   `SigningKeyPair` has no `Serialize` impl and a redacting `Debug`.
//! - No mocking of cryptographic operations in tests: all tests sign and
//!   verify with real Ed25519 keys.

pub mod error;
pub mod issuer;
pub mod jwk;
pub mod jwks;
pub mod key_material;
pub mod verify;

pub use error::{KeyMaterialError, SigningError, VerifyError};
pub use issuer::{IssuedToken, IssuerConfig, TokenClaims, TokenIssuer, TOKEN_TTL_SECS};
pub use jwk::{KeyRecord, OkpKeyRecord};
pub use jwks::{Jwk, JwkSet, JwksPublisher};
pub use key_material::{SigningAlgorithm, SigningKeyPair};
pub use verify::{verify_token, VerifyOptions};
