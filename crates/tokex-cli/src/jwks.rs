//! # JWKS Subcommand
//!
//! Loads a private key record through the same validation the service runs
//! at startup and prints the JWKS document it would publish.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tokex_crypto::{JwksPublisher, SigningKeyPair};

/// Arguments for `tokex jwks`.
#[derive(Args, Debug)]
pub struct JwksArgs {
    /// Path to the private key record.
    #[arg(long)]
    pub key: PathBuf,
    /// Write the document to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Execute the jwks subcommand.
pub fn run_jwks(args: &JwksArgs) -> Result<u8> {
    let document = render(&args.key)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, &document)
                .with_context(|| format!("failed to write JWKS document: {}", out.display()))?;
            tracing::info!(path = %out.display(), "wrote JWKS document");
        }
        None => println!("{document}"),
    }
    Ok(0)
}

/// The published JWKS document for the key record at `key`.
pub fn render(key: &std::path::Path) -> Result<String> {
    let keys = SigningKeyPair::load(key)
        .with_context(|| format!("key record rejected: {}", key.display()))?;
    let publisher = JwksPublisher::new(&keys).context("failed to build JWKS document")?;
    Ok(publisher.document_json().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{run_keygen, KeygenArgs};
    use tokex_crypto::JwkSet;

    fn keygen(dir: &std::path::Path, kid: &str) -> PathBuf {
        let out = dir.join("jwk-priv.json");
        run_keygen(&KeygenArgs {
            out: out.clone(),
            kid: Some(kid.to_string()),
            force: false,
        })
        .unwrap();
        out
    }

    #[test]
    fn renders_public_set_without_private_member() {
        let dir = tempfile::tempdir().unwrap();
        let key = keygen(dir.path(), "key-1");

        let document = render(&key).unwrap();
        let set: JwkSet = serde_json::from_str(&document).unwrap();
        assert_eq!(set.keys.len(), 1);
        assert_eq!(set.keys[0].kid, "key-1");
        assert_eq!(set.keys[0].kty, "OKP");

        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert!(value["keys"][0].get("d").is_none());
    }

    #[test]
    fn writes_to_out_file() {
        let dir = tempfile::tempdir().unwrap();
        let key = keygen(dir.path(), "key-1");
        let out = dir.path().join("jwks.json");

        let args = JwksArgs {
            key: key.clone(),
            out: Some(out.clone()),
        };
        assert_eq!(run_jwks(&args).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), render(&key).unwrap());
    }

    #[test]
    fn public_only_record_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let key = keygen(dir.path(), "key-1");
        let document = render(&key).unwrap();
        let set: serde_json::Value = serde_json::from_str(&document).unwrap();
        let public = dir.path().join("jwk-pub.json");
        std::fs::write(&public, set["keys"][0].to_string()).unwrap();

        assert!(render(&public).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(render(&dir.path().join("absent.json")).is_err());
    }
}
