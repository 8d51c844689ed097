//! # Signing Key Material
//!
//! Loads the process-wide signing key once at startup and holds it
//! immutably for the lifetime of the process.
//!
//! ## Validation
//!
//! A record becomes a [`SigningKeyPair`] only if, in order:
//!
//! 1. it parses as a key record ([`KeyRecord`]);
//! 2. it is an `OKP` record carrying the private component `d`;
//! 3. it carries a non-blank `kid`;
//! 4. `crv` is `Ed25519`, `alg` (when present) is `EdDSA`, both components
//!    decode to 32 bytes, and `x` equals the public key derived from `d`.
//!
//! Any violation fails closed. Verifiers select keys by `kid`, so a record
//! without one is rejected rather than assigned a default.
//!
//! ## Security Invariant
//!
//! Private key bytes never leave this type. `SigningKeyPair` does not
//! implement `Serialize`, and its `Debug` shows only the key id.

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use jsonwebtoken::{Algorithm, EncodingKey};
use tokex_core::KeyId;
use zeroize::Zeroizing;

use crate::error::KeyMaterialError;
use crate::jwk::{decode_component, KeyRecord, OkpKeyRecord, ED25519_CURVE, EDDSA_ALG};
use crate::jwks::Jwk;

/// PKCS#8 v1 prefix for a raw 32-byte Ed25519 private key.
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, // SEQUENCE, 46 bytes
    0x02, 0x01, 0x00, // INTEGER version 0
    0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
    0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
    0x04, 0x22, // OCTET STRING, 34 bytes
    0x04, 0x20, // OCTET STRING, 32 bytes (the key)
];

/// Asymmetric algorithm used to sign tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    /// Ed25519 signatures (RFC 8037).
    EdDsa,
}

impl SigningAlgorithm {
    /// JWS `alg` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EdDsa => EDDSA_ALG,
        }
    }

    /// The matching `jsonwebtoken` algorithm.
    pub fn jwt_algorithm(&self) -> Algorithm {
        match self {
            Self::EdDsa => Algorithm::EdDSA,
        }
    }
}

impl std::fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The validated signing key, its public half, and its key id.
///
/// The private scalar lives only inside the JWS encoding key; the
/// intermediate `ed25519_dalek::SigningKey` is zeroized once the pair is
/// built.
pub struct SigningKeyPair {
    verifying_key: VerifyingKey,
    encoding_key: EncodingKey,
    key_id: KeyId,
}

impl SigningKeyPair {
    /// Read and validate the key record at `path`.
    pub fn load(path: &Path) -> Result<Self, KeyMaterialError> {
        let json = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            KeyMaterialError::Read {
                path: path.display().to_string(),
                source,
            }
        })?);
        Self::from_json(&json)
    }

    /// Validate a key record given as JSON text.
    pub fn from_json(json: &str) -> Result<Self, KeyMaterialError> {
        let record = KeyRecord::from_json(json)?;
        Self::from_record(&record)
    }

    /// Validate a parsed key record.
    pub fn from_record(record: &KeyRecord) -> Result<Self, KeyMaterialError> {
        let okp = match record {
            KeyRecord::Okp(okp) => okp,
            other => {
                return Err(KeyMaterialError::InvalidKeyMaterial(format!(
                    "unsupported key type {}; expected OKP (Ed25519)",
                    other.key_type()
                )))
            }
        };
        Self::from_okp(okp)
    }

    fn from_okp(record: &OkpKeyRecord) -> Result<Self, KeyMaterialError> {
        let d = record.d.as_deref().ok_or_else(|| {
            KeyMaterialError::InvalidKeyMaterial(
                "record holds only a public key; a private key (d) is required".to_string(),
            )
        })?;

        let key_id = record
            .kid
            .as_deref()
            .and_then(|kid| KeyId::new(kid).ok())
            .ok_or(KeyMaterialError::MissingKeyId)?;

        if record.crv != ED25519_CURVE {
            return Err(KeyMaterialError::InvalidKeyMaterial(format!(
                "unsupported curve {}; expected {ED25519_CURVE}",
                record.crv
            )));
        }
        if let Some(alg) = record.alg.as_deref() {
            if alg != EDDSA_ALG {
                return Err(KeyMaterialError::InvalidKeyMaterial(format!(
                    "algorithm {alg} does not match an Ed25519 key"
                )));
            }
        }

        let seed = Zeroizing::new(decode_component("d", d)?);
        let declared_public = decode_component("x", &record.x)?;

        let signing_key = SigningKey::from_bytes(&seed);
        if signing_key.verifying_key().as_bytes() != &declared_public {
            return Err(KeyMaterialError::InvalidKeyMaterial(
                "public component x does not match the private key".to_string(),
            ));
        }

        Ok(Self::from_signing_key(signing_key, key_id))
    }

    /// Wrap an existing signing key under `key_id`.
    pub fn from_signing_key(signing_key: SigningKey, key_id: KeyId) -> Self {
        let mut pkcs8 = Zeroizing::new(Vec::with_capacity(48));
        pkcs8.extend_from_slice(&ED25519_PKCS8_PREFIX);
        pkcs8.extend_from_slice(signing_key.as_bytes());
        let encoding_key = EncodingKey::from_ed_der(&pkcs8);

        Self {
            verifying_key: signing_key.verifying_key(),
            encoding_key,
            key_id,
        }
    }

    /// Generate a fresh random key pair using the OS CSPRNG.
    pub fn generate(key_id: KeyId) -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_signing_key(signing_key, key_id)
    }

    /// The key identifier embedded in token headers.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// The signing algorithm for this key type.
    pub fn algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::EdDsa
    }

    /// The public key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// The public key in JWK form.
    pub fn public_jwk(&self) -> Jwk {
        Jwk::ed25519(
            URL_SAFE_NO_PAD.encode(self.verifying_key.as_bytes()),
            self.key_id.as_str(),
        )
    }

    /// Encoding key for the JWS signer.
    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm())
            .field("private_key", &"<private>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // RFC 8037 Appendix A.1 Ed25519 key.
    const RFC_D: &str = "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A";
    const RFC_X: &str = "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo";

    fn private_record(kid: Option<&str>) -> serde_json::Value {
        let mut record = serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": RFC_X,
            "d": RFC_D,
        });
        if let Some(kid) = kid {
            record["kid"] = serde_json::Value::String(kid.to_string());
        }
        record
    }

    #[test]
    fn loads_valid_private_record() {
        let pair = SigningKeyPair::from_json(&private_record(Some("key-1")).to_string()).unwrap();
        assert_eq!(pair.key_id().as_str(), "key-1");
        assert_eq!(pair.algorithm(), SigningAlgorithm::EdDsa);
        assert_eq!(URL_SAFE_NO_PAD.encode(pair.verifying_key().as_bytes()), RFC_X);
    }

    #[test]
    fn accepts_matching_alg_and_use() {
        let mut record = private_record(Some("key-1"));
        record["alg"] = "EdDSA".into();
        record["use"] = "sig".into();
        assert!(SigningKeyPair::from_json(&record.to_string()).is_ok());
    }

    #[test]
    fn rejects_public_only_record() {
        let mut record = private_record(Some("key-1"));
        record.as_object_mut().unwrap().remove("d");
        let err = SigningKeyPair::from_json(&record.to_string()).unwrap_err();
        match err {
            KeyMaterialError::InvalidKeyMaterial(msg) => assert!(msg.contains("public key")),
            other => panic!("expected InvalidKeyMaterial, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_kid() {
        let err = SigningKeyPair::from_json(&private_record(None).to_string()).unwrap_err();
        assert!(matches!(err, KeyMaterialError::MissingKeyId));
    }

    #[test]
    fn rejects_blank_kid() {
        let err = SigningKeyPair::from_json(&private_record(Some("  ")).to_string()).unwrap_err();
        assert!(matches!(err, KeyMaterialError::MissingKeyId));
    }

    #[test]
    fn rejects_rsa_record() {
        let record = serde_json::json!({"kty": "RSA", "n": "AQAB", "e": "AQAB", "d": "AQAB", "kid": "1"});
        let err = SigningKeyPair::from_json(&record.to_string()).unwrap_err();
        match err {
            KeyMaterialError::InvalidKeyMaterial(msg) => assert!(msg.contains("RSA")),
            other => panic!("expected InvalidKeyMaterial, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_curve() {
        let mut record = private_record(Some("key-1"));
        record["crv"] = "X25519".into();
        assert!(matches!(
            SigningKeyPair::from_json(&record.to_string()),
            Err(KeyMaterialError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn rejects_mismatched_alg() {
        let mut record = private_record(Some("key-1"));
        record["alg"] = "RS256".into();
        assert!(matches!(
            SigningKeyPair::from_json(&record.to_string()),
            Err(KeyMaterialError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn rejects_mismatched_public_component() {
        let mut record = private_record(Some("key-1"));
        record["x"] = URL_SAFE_NO_PAD.encode([9u8; 32]).into();
        let err = SigningKeyPair::from_json(&record.to_string()).unwrap_err();
        match err {
            KeyMaterialError::InvalidKeyMaterial(msg) => assert!(msg.contains("does not match")),
            other => panic!("expected InvalidKeyMaterial, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_private_component() {
        let mut record = private_record(Some("key-1"));
        record["d"] = URL_SAFE_NO_PAD.encode([1u8; 31]).into();
        assert!(matches!(
            SigningKeyPair::from_json(&record.to_string()),
            Err(KeyMaterialError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", private_record(Some("file-key"))).unwrap();
        let pair = SigningKeyPair::load(file.path()).unwrap();
        assert_eq!(pair.key_id().as_str(), "file-key");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SigningKeyPair::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, KeyMaterialError::Read { .. }));
    }

    #[test]
    fn generated_pairs_are_distinct() {
        let a = SigningKeyPair::generate(KeyId::new("gen").unwrap());
        let b = SigningKeyPair::generate(KeyId::new("gen").unwrap());
        assert_ne!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn public_jwk_carries_kid_and_x() {
        let pair = SigningKeyPair::from_json(&private_record(Some("key-1")).to_string()).unwrap();
        let jwk = pair.public_jwk();
        assert_eq!(jwk.kid, "key-1");
        assert_eq!(jwk.x, RFC_X);
        assert_eq!(jwk.kty, "OKP");
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let pair = SigningKeyPair::from_json(&private_record(Some("key-1")).to_string()).unwrap();
        let debug = format!("{pair:?}");
        assert!(debug.contains("key-1"));
        assert!(debug.contains("<private>"));
        assert!(!debug.contains(RFC_D));
    }
}
