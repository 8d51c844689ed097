//! # Key Records
//!
//! The on-disk form of the signing key: a JSON Web Key (RFC 7517) of key
//! type `OKP` (RFC 8037) carrying the Ed25519 private scalar in `d`.
//!
//! Parsing is a tagged-variant step on `kty`. Only `OKP` records can become
//! a [`crate::SigningKeyPair`]; `RSA` and `EC` records are recognised so that
//! they fail with a precise message instead of a generic parse error.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokex_core::KeyId;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::KeyMaterialError;

/// JWK curve name for Ed25519.
pub const ED25519_CURVE: &str = "Ed25519";

/// JWS algorithm name for Ed25519 signatures.
pub const EDDSA_ALG: &str = "EdDSA";

/// JWK `use` value for signing keys.
pub const SIGNATURE_USE: &str = "sig";

/// A key record, discriminated by its `kty` member.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum KeyRecord {
    /// Octet key pair (Ed25519 / Ed448).
    #[serde(rename = "OKP")]
    Okp(OkpKeyRecord),
    /// RSA key. Recognised but not accepted for signing.
    #[serde(rename = "RSA")]
    Rsa,
    /// Elliptic-curve key. Recognised but not accepted for signing.
    #[serde(rename = "EC")]
    Ec,
}

/// Members of an `OKP` key record.
///
/// `d` is present only on private records. All members are zeroized when
/// the record is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct OkpKeyRecord {
    pub crv: String,
    pub x: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

impl KeyRecord {
    /// Parse a key record from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, KeyMaterialError> {
        serde_json::from_str(json).map_err(|e| {
            KeyMaterialError::InvalidKeyMaterial(format!("unparseable key record: {e}"))
        })
    }

    /// The `kty` member of this record.
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::Okp(_) => "OKP",
            Self::Rsa => "RSA",
            Self::Ec => "EC",
        }
    }

    /// Render the record as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, KeyMaterialError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            KeyMaterialError::InvalidKeyMaterial(format!("key record encoding failed: {e}"))
        })
    }
}

impl OkpKeyRecord {
    /// Build a private record for an Ed25519 signing key.
    pub fn from_signing_key(signing_key: &SigningKey, kid: &KeyId) -> Self {
        Self {
            crv: ED25519_CURVE.to_string(),
            x: URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes()),
            d: Some(URL_SAFE_NO_PAD.encode(signing_key.as_bytes())),
            kid: Some(kid.as_str().to_string()),
            alg: Some(EDDSA_ALG.to_string()),
            key_use: Some(SIGNATURE_USE.to_string()),
        }
    }

    /// Whether this record carries private key material.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }
}

impl std::fmt::Debug for OkpKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkpKeyRecord")
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("use", &self.key_use)
            .finish()
    }
}

/// Decode a base64url (unpadded) 32-byte key component.
pub(crate) fn decode_component(
    name: &str,
    value: &str,
) -> Result<[u8; 32], KeyMaterialError> {
    let bytes = URL_SAFE_NO_PAD.decode(value).map_err(|e| {
        KeyMaterialError::InvalidKeyMaterial(format!("component {name} is not base64url: {e}"))
    })?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        KeyMaterialError::InvalidKeyMaterial(format!(
            "component {name} must be 32 bytes, got {len}"
        ))
    })
}

/// RFC 7638 thumbprint of an Ed25519 public key, base64url encoded.
///
/// The members are hashed in lexicographic order with no whitespace, so
/// the result is stable for a given `x`.
pub fn ed25519_thumbprint(x: &str) -> String {
    let canonical = format!(r#"{{"crv":"{ED25519_CURVE}","kty":"OKP","x":"{x}"}}"#);
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    #[test]
    fn okp_record_parses_with_tag() {
        let json = r#"{"kty":"OKP","crv":"Ed25519","x":"abc","d":"def","kid":"k1"}"#;
        match KeyRecord::from_json(json).unwrap() {
            KeyRecord::Okp(record) => {
                assert_eq!(record.crv, "Ed25519");
                assert_eq!(record.kid.as_deref(), Some("k1"));
                assert!(record.is_private());
            }
            other => panic!("expected OKP record, got {other:?}"),
        }
    }

    #[test]
    fn rsa_record_is_recognised() {
        let json = r#"{"kty":"RSA","n":"AQAB","e":"AQAB","kid":"1"}"#;
        let record = KeyRecord::from_json(json).unwrap();
        assert_eq!(record.key_type(), "RSA");
    }

    #[test]
    fn unknown_kty_is_invalid() {
        let json = r#"{"kty":"oct","k":"secret"}"#;
        assert!(matches!(
            KeyRecord::from_json(json),
            Err(KeyMaterialError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            KeyRecord::from_json("not json"),
            Err(KeyMaterialError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn generated_record_serializes_with_kty() {
        let kid = KeyId::new("k1").unwrap();
        let record = KeyRecord::Okp(OkpKeyRecord::from_signing_key(&fixed_key(), &kid));
        let json = record.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kty"], "OKP");
        assert_eq!(value["crv"], "Ed25519");
        assert_eq!(value["kid"], "k1");
        assert_eq!(value["alg"], "EdDSA");
        assert_eq!(value["use"], "sig");
        assert!(value["d"].is_string());
    }

    #[test]
    fn debug_redacts_private_component() {
        let kid = KeyId::new("k1").unwrap();
        let record = OkpKeyRecord::from_signing_key(&fixed_key(), &kid);
        let d = record.d.clone().unwrap();
        let debug = format!("{record:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&d));
    }

    #[test]
    fn decode_component_checks_length() {
        let short = URL_SAFE_NO_PAD.encode([1u8; 16]);
        assert!(decode_component("x", &short).is_err());
        let ok = URL_SAFE_NO_PAD.encode([1u8; 32]);
        assert_eq!(decode_component("x", &ok).unwrap(), [1u8; 32]);
        assert!(decode_component("x", "!!!").is_err());
    }

    #[test]
    fn thumbprint_is_stable_and_url_safe() {
        let x = URL_SAFE_NO_PAD.encode(fixed_key().verifying_key().as_bytes());
        let a = ed25519_thumbprint(&x);
        let b = ed25519_thumbprint(&x);
        assert_eq!(a, b);
        assert_eq!(a.len(), 43);
        assert!(!a.contains('=') && !a.contains('+') && !a.contains('/'));
    }

    #[test]
    fn thumbprint_matches_rfc8037_example() {
        // RFC 8037 Appendix A.3.
        let x = "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo";
        assert_eq!(
            ed25519_thumbprint(x),
            "kPrK_qmxVWaYVA9wwBF6Iuo3vVzz7TxHCTwXBygrS4k"
        );
    }
}
