//! # tokex CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

/// Token exchange operator tooling.
///
/// Generates signing key records, renders the published JWKS document, and
/// verifies issued tokens the way a relying party would.
#[derive(Parser, Debug)]
#[command(name = "tokex", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 private key record.
    Keygen(tokex_cli::keygen::KeygenArgs),
    /// Print the JWKS document for a private key record.
    Jwks(tokex_cli::jwks::JwksArgs),
    /// Verify a token against a JWKS document.
    Verify(tokex_cli::verify::VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Keygen(args) => tokex_cli::keygen::run_keygen(args),
        Commands::Jwks(args) => tokex_cli::jwks::run_jwks(args),
        Commands::Verify(args) => tokex_cli::verify::run_verify(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
