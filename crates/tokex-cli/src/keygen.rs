//! # Keygen Subcommand
//!
//! Generates an Ed25519 private key record in the JSON Web Key form the
//! service loads at startup. The key id defaults to the RFC 7638 thumbprint
//! of the public key.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Args;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use tokex_core::KeyId;
use tokex_crypto::jwk::ed25519_thumbprint;
use tokex_crypto::{KeyRecord, OkpKeyRecord, SigningKeyPair};

/// Arguments for `tokex keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output path for the private key record.
    #[arg(long, short)]
    pub out: PathBuf,
    /// Key id to embed. Defaults to the key's RFC 7638 thumbprint.
    #[arg(long)]
    pub kid: Option<String>,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let record = generate_record(args.kid.as_deref())?;
    let json = KeyRecord::Okp(record.clone()).to_json_pretty()?;

    // Round-trip through the loader so the file is known to be accepted.
    let keys = SigningKeyPair::from_json(&json).context("generated key record failed validation")?;

    write_private(&args.out, &json, args.force)?;
    tracing::info!(path = %args.out.display(), kid = %keys.key_id(), "wrote key record");

    println!("OK: generated Ed25519 key record");
    println!("  Path: {}", args.out.display());
    println!("  kid:  {}", keys.key_id());
    println!("  x:    {}", record.x);
    Ok(0)
}

/// Generate a fresh private `OKP` record.
pub fn generate_record(kid: Option<&str>) -> Result<OkpKeyRecord> {
    let signing_key = SigningKey::generate(&mut OsRng);
    let kid = match kid {
        Some(kid) => KeyId::new(kid).context("invalid --kid")?,
        None => {
            let x = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes());
            KeyId::new(ed25519_thumbprint(&x)).context("thumbprint is not a valid key id")?
        }
    };
    Ok(OkpKeyRecord::from_signing_key(&signing_key, &kid))
}

fn write_private(path: &Path, contents: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "refusing to overwrite {} (pass --force to replace it)",
            path.display()
        );
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create key record: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .with_context(|| format!("failed to write key record: {}", path.display()))?;
    Ok(())
}
