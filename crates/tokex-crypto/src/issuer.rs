//! # Token Issuance
//!
//! Mints short-lived compact JWS tokens asserting an organization identity.
//!
//! ## Claims
//!
//! | Claim | Value |
//! |-------|-------|
//! | `iss` | configured issuer |
//! | `aud` | configured audience |
//! | `sub`, `org` | organization id |
//! | `jti` | fresh UUID v4 |
//! | `iat`, `nbf` | issuance instant (seconds) |
//! | `exp` | `iat` + [`TOKEN_TTL_SECS`] |
//!
//! The header carries `alg = EdDSA`, `typ = JWT` and the signing key's
//! `kid`. Tokens are returned to the caller and never stored or logged.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::Header;
use serde::{Deserialize, Serialize};
use tokex_core::{KeyId, OrganizationId, TokenId};

use crate::error::SigningError;
use crate::key_material::SigningKeyPair;

/// Token lifetime: one hour.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Default `iss` and `aud` value.
pub const DEFAULT_ISSUER: &str = "token-exchange-service";

/// Claim set of an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    /// Organization the bearer acts for.
    pub org: String,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Issuer identity stamped into every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    pub issuer: String,
    pub audience: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_ISSUER.to_string(),
        }
    }
}

/// A freshly minted token. Transient: never persisted.
///
/// `issued_at` and `expires_at` keep sub-second precision; the wire claims
/// are whole seconds.
pub struct IssuedToken {
    token_id: TokenId,
    organization_id: OrganizationId,
    key_id: KeyId,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    compact: String,
}

impl IssuedToken {
    /// The `jti` of this token.
    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    /// The organization asserted by this token.
    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    /// The `kid` in the token header.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Issuance instant.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The compact serialization to hand to the caller.
    pub fn as_compact(&self) -> &str {
        &self.compact
    }

    /// Consume the token, returning its compact serialization.
    pub fn into_compact(self) -> String {
        self.compact
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token_id", &self.token_id)
            .field("organization_id", &self.organization_id)
            .field("key_id", &self.key_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("compact", &"[REDACTED]")
            .finish()
    }
}

/// Signs organization tokens with the process signing key.
///
/// Shared across requests behind an `Arc`. The only mutable state is the
/// last issuance instant, kept so that successive tokens always carry
/// strictly increasing `issued_at` values.
#[derive(Debug)]
pub struct TokenIssuer {
    keys: Arc<SigningKeyPair>,
    config: IssuerConfig,
    last_issued_micros: AtomicI64,
    issued: AtomicU64,
}

impl TokenIssuer {
    /// Create an issuer for `keys`.
    pub fn new(keys: Arc<SigningKeyPair>, config: IssuerConfig) -> Self {
        Self {
            keys,
            config,
            last_issued_micros: AtomicI64::new(i64::MIN),
            issued: AtomicU64::new(0),
        }
    }

    /// The signing key used by this issuer.
    pub fn keys(&self) -> &SigningKeyPair {
        &self.keys
    }

    /// The configured issuer identity.
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Number of tokens minted by this issuer.
    pub fn issued_count(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Mint a token for `organization_id` at the current time.
    pub fn issue(&self, organization_id: &OrganizationId) -> Result<IssuedToken, SigningError> {
        let now = self.next_instant(Utc::now())?;
        self.issue_at(organization_id, now)
    }

    /// Mint a token for `organization_id` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        organization_id: &OrganizationId,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, SigningError> {
        let expires_at = issued_at
            .checked_add_signed(Duration::seconds(TOKEN_TTL_SECS))
            .ok_or_else(|| SigningError::Clock(format!("expiry after {issued_at} overflows")))?;

        let token_id = TokenId::new();
        let claims = TokenClaims {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            sub: organization_id.as_str().to_string(),
            org: organization_id.as_str().to_string(),
            jti: token_id.to_string(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(self.keys.algorithm().jwt_algorithm());
        header.kid = Some(self.keys.key_id().as_str().to_string());

        let compact = jsonwebtoken::encode(&header, &claims, self.keys.encoding_key())
            .map_err(|e| SigningError::Encode(e.to_string()))?;
        self.issued.fetch_add(1, Ordering::Relaxed);

        Ok(IssuedToken {
            token_id,
            organization_id: organization_id.clone(),
            key_id: self.keys.key_id().clone(),
            issued_at,
            expires_at,
            compact,
        })
    }

    /// Return `now`, or one microsecond past the previous issuance if the
    /// clock has not advanced.
    fn next_instant(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SigningError> {
        let now_micros = now.timestamp_micros();
        let previous = self
            .last_issued_micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now_micros.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let micros = now_micros.max(previous.saturating_add(1));
        DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| SigningError::Clock(format!("instant {micros}us out of range")))
    }
}
