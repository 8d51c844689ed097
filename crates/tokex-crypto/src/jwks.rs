//! # JWKS Publication
//!
//! Renders the public half of the signing key as a JSON Web Key Set
//! (RFC 7517 §5) so relying parties can verify issued tokens.
//!
//! The set has exactly one entry. It is built once from the immutable
//! [`SigningKeyPair`] and its serialized bytes are cached, so every call to
//! [`JwksPublisher::document_json`] returns the same bytes for the lifetime
//! of the process.

use serde::{Deserialize, Serialize};

use crate::error::KeyMaterialError;
use crate::jwk::{ED25519_CURVE, EDDSA_ALG, SIGNATURE_USE};
use crate::key_material::SigningKeyPair;

/// A public JSON Web Key for an Ed25519 verification key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    /// Base64url-encoded 32-byte public key.
    pub x: String,
    pub kid: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

/// A JSON Web Key Set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl Jwk {
    /// Public signing JWK for an Ed25519 key.
    pub fn ed25519(x: String, kid: &str) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: ED25519_CURVE.to_string(),
            x,
            kid: kid.to_string(),
            key_use: Some(SIGNATURE_USE.to_string()),
            alg: Some(EDDSA_ALG.to_string()),
        }
    }
}

impl JwkSet {
    /// Find the key with the given `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

/// Serves the verification key set for the loaded signing key.
#[derive(Debug, Clone)]
pub struct JwksPublisher {
    set: JwkSet,
    json: String,
}

impl JwksPublisher {
    /// Build the key set for `keys`.
    pub fn new(keys: &SigningKeyPair) -> Result<Self, KeyMaterialError> {
        let set = JwkSet {
            keys: vec![keys.public_jwk()],
        };
        let json = serde_json::to_string(&set).map_err(|e| {
            KeyMaterialError::InvalidKeyMaterial(format!("JWKS encoding failed: {e}"))
        })?;
        Ok(Self { set, json })
    }

    /// The verification key set.
    pub fn publish(&self) -> &JwkSet {
        &self.set
    }

    /// The serialized key set. Identical on every call.
    pub fn document_json(&self) -> &str {
        &self.json
    }
}
