//! # Service Bootstrap
//!
//! Builds [`AppState`] from [`AppConfig`] at startup.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Load Signing Key**: Parse and validate the key record. Any failure
//!    is fatal: the service never serves without valid signing material.
//! 2. **Build Publisher and Issuer**: Derive the JWKS document once.
//! 3. **Open Credential Store**: PostgreSQL when `DATABASE_URL` is set,
//!    otherwise the in-memory store, optionally seeded from a file.
//! 4. **Log Service Identity**: Key id, algorithm, store backend.

use std::sync::Arc;

use tokex_crypto::{JwksPublisher, KeyMaterialError, SigningKeyPair, TokenIssuer};
use tokex_store::{
    ApiKeyRepository, BackendError, CredentialStore, MemoryApiKeyRepository, PgApiKeyRepository,
    SeedError,
};

use crate::exchange::ExchangeService;
use crate::state::{AppConfig, AppState};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors during service bootstrap. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The signing key record is missing or unusable.
    #[error("signing key error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    /// The credential database could not be opened.
    #[error("credential store error: {0}")]
    Store(#[from] BackendError),

    /// The in-memory seed document could not be loaded.
    #[error("credential seed error: {0}")]
    Seed(#[from] SeedError),
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Build the application state.
pub async fn bootstrap(config: &AppConfig) -> Result<AppState, BootstrapError> {
    let keys = Arc::new(load_signing_key(config)?);
    let jwks = JwksPublisher::new(&keys)?;
    let issuer = Arc::new(TokenIssuer::new(Arc::clone(&keys), config.issuer.clone()));

    let repo = open_repository(config).await?;
    let store = CredentialStore::new(repo, config.lookup_timeout);

    log_banner(config, &keys, &store);

    Ok(AppState::new(ExchangeService::new(store, issuer), jwks))
}

// ---------------------------------------------------------------------------
// Phase 1: Load Signing Key
// ---------------------------------------------------------------------------

fn load_signing_key(config: &AppConfig) -> Result<SigningKeyPair, KeyMaterialError> {
    SigningKeyPair::load(&config.private_key_path).map_err(|e| {
        tracing::error!(
            path = %config.private_key_path.display(),
            error = %e,
            "failed to load signing key"
        );
        e
    })
}

// ---------------------------------------------------------------------------
// Phase 3: Open Credential Store
// ---------------------------------------------------------------------------

async fn open_repository(config: &AppConfig) -> Result<Arc<dyn ApiKeyRepository>, BootstrapError> {
    if let Some(url) = &config.database_url {
        let repo = PgApiKeyRepository::connect(url, config.store_namespace.clone()).await?;
        return Ok(Arc::new(repo));
    }

    tracing::warn!("DATABASE_URL not set, using the in-memory credential store");
    let repo = match &config.seed_file {
        Some(path) => {
            let repo = MemoryApiKeyRepository::from_seed_file(path)?;
            tracing::info!(
                seed_file = %path.display(),
                api_keys = repo.key_count(),
                "seeded in-memory credential store"
            );
            repo
        }
        None => {
            tracing::warn!(
                "CREDENTIALS_SEED_FILE not set, in-memory store is empty and every exchange will be rejected"
            );
            MemoryApiKeyRepository::new()
        }
    };
    Ok(Arc::new(repo))
}

// ---------------------------------------------------------------------------
// Phase 4: Log Service Identity
// ---------------------------------------------------------------------------

fn log_banner(config: &AppConfig, keys: &SigningKeyPair, store: &CredentialStore) {
    tracing::info!(
        kid = %keys.key_id(),
        algorithm = %keys.algorithm(),
        store = store.backend_name(),
        namespace = %config.store_namespace,
        lookup_timeout_ms = config.lookup_timeout.as_millis() as u64,
        issuer = %config.issuer.issuer,
        audience = %config.issuer.audience,
        "token exchange service bootstrapped"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
