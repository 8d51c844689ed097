//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the exchange.
//! These prevent accidental identifier confusion: you cannot pass an
//! `ApiKey` where an `OrganizationId` is expected.
//!
//! ## Security Invariant
//!
//! `ApiKey` holds a bearer secret. It implements neither `Serialize` nor a
//! revealing `Debug`/`Display`, and its value is only reachable through
//! [`ApiKey::expose`]. Comparison is exact and case-sensitive.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum accepted API key length in bytes.
pub const MAX_API_KEY_LEN: usize = 512;

/// Maximum accepted organization identifier length in bytes.
const MAX_ORGANIZATION_ID_LEN: usize = 256;

/// Maximum accepted key identifier length in bytes.
const MAX_KEY_ID_LEN: usize = 256;

/// Identifier of the organization that owns an API key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationId(String);

/// Opaque long-lived API key presented by a caller.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ApiKey(String);

/// Identifier of a signing key, embedded in token headers as `kid`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

/// Unique identifier of an issued token (the `jti` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

fn check(
    kind: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { kind });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            kind,
            max,
            actual: value.len(),
        });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacters { kind });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// OrganizationId
// ---------------------------------------------------------------------------

impl OrganizationId {
    /// Create an organization identifier, rejecting empty or oversized input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check("organization id", &value, MAX_ORGANIZATION_ID_LEN)?;
        Ok(Self(value))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrganizationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrganizationId> for String {
    fn from(id: OrganizationId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ApiKey
// ---------------------------------------------------------------------------

impl ApiKey {
    /// Wrap a presented API key.
    ///
    /// Rejects empty keys and keys longer than [`MAX_API_KEY_LEN`]. The value
    /// is otherwise opaque: no trimming, no case folding.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { kind: "api key" });
        }
        if value.len() > MAX_API_KEY_LEN {
            return Err(ValidationError::TooLong {
                kind: "api key",
                max: MAX_API_KEY_LEN,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }

    /// Reveal the raw key value for an exact-match store lookup.
    ///
    /// Never pass the result to a logger.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApiKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// KeyId
// ---------------------------------------------------------------------------

impl KeyId {
    /// Create a key identifier, rejecting blank or oversized input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check("key id", &value, MAX_KEY_ID_LEN)?;
        Ok(Self(value))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

impl TokenId {
    /// Generate a fresh random token identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
