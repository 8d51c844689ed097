//! # Relying-Party Verification
//!
//! Checks a compact token against a published key set: the header must name
//! `EdDSA` and a `kid` present in the set, the signature must verify under
//! that key, and the validity window (`nbf`..`exp`) must contain the current
//! time. Issuer and audience are checked only when the caller asks.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::error::VerifyError;
use crate::issuer::TokenClaims;
use crate::jwks::JwkSet;

/// What a relying party expects of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Required `iss`, if any.
    pub issuer: Option<String>,
    /// Required `aud`, if any.
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp` and `nbf`, in seconds.
    pub leeway_secs: u64,
}

/// Verify `token` against `jwks` and return its claims.
pub fn verify_token(
    token: &str,
    jwks: &JwkSet,
    options: &VerifyOptions,
) -> Result<TokenClaims, VerifyError> {
    let header =
        jsonwebtoken::decode_header(token).map_err(|e| VerifyError::Malformed(e.to_string()))?;
    if header.alg != Algorithm::EdDSA {
        return Err(VerifyError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
    }
    let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;
    let jwk = jwks
        .find(&kid)
        .ok_or_else(|| VerifyError::UnknownKeyId(kid.clone()))?;
    if jwk.kty != "OKP" {
        return Err(VerifyError::InvalidKey(format!(
            "key {kid} has type {}, expected OKP",
            jwk.kty
        )));
    }
    let key = DecodingKey::from_ed_components(&jwk.x)
        .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.leeway = options.leeway_secs;
    validation.validate_nbf = true;
    if let Some(iss) = &options.issuer {
        validation.set_issuer(&[iss.as_str()]);
    }
    match &options.audience {
        Some(aud) => validation.set_audience(&[aud.as_str()]),
        None => validation.validate_aud = false,
    }

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::ImmatureSignature => VerifyError::NotYetValid,
            ErrorKind::InvalidIssuer => VerifyError::InvalidIssuer,
            ErrorKind::InvalidAudience => VerifyError::InvalidAudience,
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidEcdsaKey => {
                VerifyError::InvalidKey(e.to_string())
            }
            _ => VerifyError::Malformed(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::{Duration, Utc};
    use tokex_core::{KeyId, OrganizationId};

    use crate::issuer::{IssuerConfig, TokenIssuer, DEFAULT_ISSUER};
    use crate::jwks::JwksPublisher;
    use crate::key_material::SigningKeyPair;

    fn setup(kid: &str) -> (TokenIssuer, JwkSet) {
        let keys = Arc::new(SigningKeyPair::generate(KeyId::new(kid).unwrap()));
        let jwks = JwksPublisher::new(&keys).unwrap().publish().clone();
        (TokenIssuer::new(keys, IssuerConfig::default()), jwks)
    }

    fn org() -> OrganizationId {
        OrganizationId::new("org-42").unwrap()
    }

    #[test]
    fn issued_token_verifies_against_published_set() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        let claims = verify_token(token.as_compact(), &jwks, &VerifyOptions::default()).unwrap();
        assert_eq!(claims.org, "org-42");
        assert_eq!(claims.jti, token.token_id().to_string());
    }

    #[test]
    fn expected_issuer_and_audience_accepted() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        let options = VerifyOptions {
            issuer: Some(DEFAULT_ISSUER.to_string()),
            audience: Some(DEFAULT_ISSUER.to_string()),
            leeway_secs: 0,
        };
        assert!(verify_token(token.as_compact(), &jwks, &options).is_ok());
    }

    #[test]
    fn wrong_issuer_rejected() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        let options = VerifyOptions {
            issuer: Some("someone-else".to_string()),
            ..VerifyOptions::default()
        };
        assert_eq!(
            verify_token(token.as_compact(), &jwks, &options),
            Err(VerifyError::InvalidIssuer)
        );
    }

    #[test]
    fn wrong_audience_rejected() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        let options = VerifyOptions {
            audience: Some("other-api".to_string()),
            ..VerifyOptions::default()
        };
        assert_eq!(
            verify_token(token.as_compact(), &jwks, &options),
            Err(VerifyError::InvalidAudience)
        );
    }

    #[test]
    fn unknown_kid_rejected() {
        let (issuer, _) = setup("key-1");
        let (_, other_jwks) = setup("key-2");
        let token = issuer.issue(&org()).unwrap();
        assert_eq!(
            verify_token(token.as_compact(), &other_jwks, &VerifyOptions::default()),
            Err(VerifyError::UnknownKeyId("key-1".to_string()))
        );
    }

    #[test]
    fn signature_from_different_key_rejected() {
        let (issuer, _) = setup("key-1");
        let (_, other_jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        assert_eq!(
            verify_token(token.as_compact(), &other_jwks, &VerifyOptions::default()),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_rejected() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer.issue(&org()).unwrap();
        let parts: Vec<&str> = token.as_compact().split('.').collect();
        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["org"] = serde_json::json!("org-1");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(
            verify_token(&forged, &jwks, &VerifyOptions::default()),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_rejected() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer
            .issue_at(&org(), Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(
            verify_token(token.as_compact(), &jwks, &VerifyOptions::default()),
            Err(VerifyError::Expired)
        );
    }

    #[test]
    fn future_token_rejected() {
        let (issuer, jwks) = setup("key-1");
        let token = issuer
            .issue_at(&org(), Utc::now() + Duration::minutes(10))
            .unwrap();
        assert_eq!(
            verify_token(token.as_compact(), &jwks, &VerifyOptions::default()),
            Err(VerifyError::NotYetValid)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let (_, jwks) = setup("key-1");
        assert!(matches!(
            verify_token("not-a-token", &jwks, &VerifyOptions::default()),
            Err(VerifyError::Malformed(_))
        ));
    }

    #[test]
    fn non_eddsa_header_rejected() {
        let (_, jwks) = setup("key-1");
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT","kid":"key-1"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"org":"org-42"}"#);
        let token = format!("{header}.{payload}.c2ln");
        assert!(matches!(
            verify_token(&token, &jwks, &VerifyOptions::default()),
            Err(VerifyError::UnsupportedAlgorithm(_))
        ));
    }
}
