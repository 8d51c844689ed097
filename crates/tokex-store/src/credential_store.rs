//! # Credential Resolution
//!
//! [`CredentialStore::resolve`] turns a presented API key into the owning
//! organization's identifier.
//!
//! | Repository result | Outcome |
//! |-------------------|---------|
//! | one or more records | first record's parent organization |
//! | no records | [`CredentialError::InvalidCredential`] |
//! | backend error | [`CredentialError::StoreUnavailable`] |
//! | deadline elapsed | [`CredentialError::StoreUnavailable`] |
//!
//! The key value is never logged. Dropping the returned future cancels the
//! lookup; no token can be issued from a cancelled resolution.

use std::sync::Arc;
use std::time::Duration;

use tokex_core::{ApiKey, OrganizationId};

use crate::error::{BackendError, CredentialError};
use crate::repository::ApiKeyRepository;

/// Default deadline for a single store lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves API keys through a shared repository.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn ApiKeyRepository>,
    lookup_timeout: Duration,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn ApiKeyRepository>, lookup_timeout: Duration) -> Self {
        Self {
            repo,
            lookup_timeout,
        }
    }

    /// The backend name of the underlying repository.
    pub fn backend_name(&self) -> &'static str {
        self.repo.backend_name()
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Resolve `key` to its owning organization.
    pub async fn resolve(&self, key: &ApiKey) -> Result<OrganizationId, CredentialError> {
        let lookup = self.repo.find_by_key(key, 1);
        let records = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                tracing::debug!(
                    backend = self.repo.backend_name(),
                    error = %err,
                    "credential lookup failed"
                );
                return Err(CredentialError::StoreUnavailable(err));
            }
            Err(_) => {
                tracing::debug!(
                    backend = self.repo.backend_name(),
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "credential lookup timed out"
                );
                return Err(CredentialError::StoreUnavailable(BackendError::Timeout(
                    self.lookup_timeout,
                )));
            }
        };

        records
            .into_iter()
            .next()
            .map(|record| record.organization_id)
            .ok_or(CredentialError::InvalidCredential)
    }

    /// Resolve a raw key string. Keys that fail [`ApiKey`] validation are
    /// indistinguishable from unknown keys and never reach the store.
    pub async fn resolve_raw(&self, raw: &str) -> Result<OrganizationId, CredentialError> {
        let key = ApiKey::new(raw).map_err(|_| CredentialError::InvalidCredential)?;
        self.resolve(&key).await
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.repo.backend_name())
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}
