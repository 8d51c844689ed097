//! # Cryptographic Error Types
//!
//! Structured errors for key loading, token signing and token verification.
//! Key-material errors are startup-only and fatal; signing errors surface to
//! the exchange orchestrator; verification errors belong to relying parties.

use thiserror::Error;

/// Errors raised while loading and validating the signing key record.
#[derive(Error, Debug)]
pub enum KeyMaterialError {
    /// The key record could not be read from its location.
    #[error("failed to read key record at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The record is unparseable, public-only, or otherwise unusable.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The record carries no usable key identifier.
    #[error("key record has no key id (kid)")]
    MissingKeyId,
}

/// Errors raised while minting a token.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The JWS encoder rejected the key or claims.
    #[error("token signing failed: {0}")]
    Encode(String),

    /// The issuance instant or expiry could not be represented.
    #[error("token validity window out of range: {0}")]
    Clock(String),
}

/// Errors raised while verifying a token against a JWKS document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The token is not a well-formed compact JWS.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The header names an algorithm other than EdDSA.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The header carries no `kid`.
    #[error("token header has no key id")]
    MissingKeyId,

    /// No key in the set matches the header `kid`.
    #[error("no published key with id {0}")]
    UnknownKeyId(String),

    /// The matching key entry is unusable.
    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    /// The signature does not verify.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is past its `exp`.
    #[error("token expired")]
    Expired,

    /// The token is before its `nbf`.
    #[error("token not yet valid")]
    NotYetValid,

    /// The `iss` claim does not match.
    #[error("unexpected token issuer")]
    InvalidIssuer,

    /// The `aud` claim does not match.
    #[error("unexpected token audience")]
    InvalidAudience,
}
