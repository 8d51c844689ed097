//! # Verify Subcommand
//!
//! Checks a token the way a relying party would: against a JWKS document,
//! optionally pinning issuer and audience. Prints the claims on success.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tokex_crypto::{verify_token, JwkSet, TokenClaims, VerifyOptions};

/// Arguments for `tokex verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the JWKS document.
    #[arg(long)]
    pub jwks: PathBuf,
    /// Compact token to verify, or `-` to read it from stdin.
    #[arg(long)]
    pub token: String,
    /// Required `iss` claim.
    #[arg(long)]
    pub issuer: Option<String>,
    /// Required `aud` claim.
    #[arg(long)]
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp` and `nbf`, in seconds.
    #[arg(long, default_value_t = 0)]
    pub leeway: u64,
}

/// Execute the verify subcommand. Exit code 1 means the token was rejected.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let jwks = load_jwks(&args.jwks)?;
    let token = if args.token == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read token from stdin")?;
        buf
    } else {
        args.token.clone()
    };

    let options = VerifyOptions {
        issuer: args.issuer.clone(),
        audience: args.audience.clone(),
        leeway_secs: args.leeway,
    };

    match check(token.trim(), &jwks, &options) {
        Ok(claims) => {
            println!("OK: token is valid");
            println!(
                "{}",
                serde_json::to_string_pretty(&claims).context("failed to render claims")?
            );
            Ok(0)
        }
        Err(reason) => {
            println!("FAIL: {reason}");
            Ok(1)
        }
    }
}

fn check(token: &str, jwks: &JwkSet, options: &VerifyOptions) -> Result<TokenClaims, String> {
    verify_token(token, jwks, options).map_err(|e| e.to_string())
}

/// Read and parse a JWKS document.
pub fn load_jwks(path: &Path) -> Result<JwkSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read JWKS document: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JWKS document: {}", path.display()))
}
