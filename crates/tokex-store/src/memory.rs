//! # In-Memory Credential Backend
//!
//! A `parking_lot::RwLock`-guarded map of API-key records keyed by exact
//! key value. Used for development, tests, and deployments without a
//! database. Contents can be seeded from a JSON document:
//!
//! ```json
//! {
//!   "organizations": [
//!     {"id": "org-42", "name": "Acme", "email": "ops@acme.test"}
//!   ],
//!   "api_keys": [
//!     {"key": "abc123", "organization_id": "org-42"}
//!   ]
//! }
//! ```
//!
//! Seeding enforces the store's structural invariants: key values are
//! unique, and every key references a seeded organization.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tokex_core::{ApiKey, ApiKeyRecord, Organization, OrganizationId};

use crate::error::{BackendError, SeedError};
use crate::repository::ApiKeyRepository;

/// Seed document for [`MemoryApiKeyRepository`].
#[derive(Debug, Default, Deserialize)]
pub struct CredentialSeed {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
}

impl CredentialSeed {
    /// Parse a seed document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        serde_json::from_str(json).map_err(|e| SeedError::Parse(e.to_string()))
    }

    /// Read and parse a seed document.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Default)]
struct Inner {
    organizations: HashMap<OrganizationId, Organization>,
    api_keys: HashMap<ApiKey, ApiKeyRecord>,
}

/// In-memory [`ApiKeyRepository`].
#[derive(Debug, Default)]
pub struct MemoryApiKeyRepository {
    inner: RwLock<Inner>,
}

impl MemoryApiKeyRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding exactly the contents of `seed`.
    pub fn from_seed(seed: CredentialSeed) -> Result<Self, SeedError> {
        let mut inner = Inner::default();
        for org in seed.organizations {
            inner.organizations.insert(org.id.clone(), org);
        }
        for (index, record) in seed.api_keys.into_iter().enumerate() {
            if !inner.organizations.contains_key(&record.organization_id) {
                return Err(SeedError::UnknownOrganization {
                    index,
                    organization_id: record.organization_id.to_string(),
                });
            }
            if inner.api_keys.contains_key(&record.key) {
                return Err(SeedError::DuplicateKey { index });
            }
            inner.api_keys.insert(record.key.clone(), record);
        }
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// A store seeded from the JSON document at `path`.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        Self::from_seed(CredentialSeed::load(path)?)
    }

    /// Add or replace an organization.
    pub fn insert_organization(&self, organization: Organization) {
        self.inner
            .write()
            .organizations
            .insert(organization.id.clone(), organization);
    }

    /// Add an API-key record. Fails if the key already exists or its parent
    /// organization is unknown.
    pub fn insert_api_key(&self, record: ApiKeyRecord) -> Result<(), SeedError> {
        let mut inner = self.inner.write();
        let index = inner.api_keys.len();
        if !inner.organizations.contains_key(&record.organization_id) {
            return Err(SeedError::UnknownOrganization {
                index,
                organization_id: record.organization_id.to_string(),
            });
        }
        if inner.api_keys.contains_key(&record.key) {
            return Err(SeedError::DuplicateKey { index });
        }
        inner.api_keys.insert(record.key.clone(), record);
        Ok(())
    }

    /// Look up an organization by id.
    pub fn organization(&self, id: &OrganizationId) -> Option<Organization> {
        self.inner.read().organizations.get(id).cloned()
    }

    /// Number of stored API keys.
    pub fn key_count(&self) -> usize {
        self.inner.read().api_keys.len()
    }
}

#[async_trait]
impl ApiKeyRepository for MemoryApiKeyRepository {
    async fn find_by_key(
        &self,
        key: &ApiKey,
        limit: usize,
    ) -> Result<Vec<ApiKeyRecord>, BackendError> {
        let inner = self.inner.read();
        Ok(inner
            .api_keys
            .get(key)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEED: &str = r#"{
        "organizations": [
            {"id": "org-42", "name": "Acme", "email": "ops@acme.test", "created_at": "2024-01-01T00:00:00Z"},
            {"id": "org-7", "name": "Globex", "email": "it@globex.test", "probability_multiplier": 1.5}
        ],
        "api_keys": [
            {"key": "abc123", "organization_id": "org-42"},
            {"key": "ABC123", "organization_id": "org-7"}
        ]
    }"#;

    fn key(value: &str) -> ApiKey {
        ApiKey::new(value).unwrap()
    }

    fn seeded() -> MemoryApiKeyRepository {
        MemoryApiKeyRepository::from_seed(CredentialSeed::from_json(SEED).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn finds_exact_match() {
        let repo = seeded();
        let found = repo.find_by_key(&key("abc123"), 1).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].organization_id.as_str(), "org-42");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let repo = seeded();
        let found = repo.find_by_key(&key("ABC123"), 1).await.unwrap();
        assert_eq!(found[0].organization_id.as_str(), "org-7");
    }

    #[tokio::test]
    async fn prefix_does_not_match() {
        let repo = seeded();
        assert!(repo.find_by_key(&key("abc"), 1).await.unwrap().is_empty());
        assert!(repo.find_by_key(&key("abc1234"), 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_limit_returns_nothing() {
        let repo = seeded();
        assert!(repo.find_by_key(&key("abc123"), 0).await.unwrap().is_empty());
    }

    #[test]
    fn seed_keeps_organization_fields() {
        let repo = seeded();
        let org = repo
            .organization(&OrganizationId::new("org-7").unwrap())
            .unwrap();
        assert_eq!(org.name, "Globex");
        assert_eq!(org.probability_multiplier, Some(1.5));
        assert_eq!(repo.key_count(), 2);
    }

    #[test]
    fn seed_rejects_duplicate_keys() {
        let json = r#"{
            "organizations": [{"id": "org-1", "name": "a", "email": "a@a.test"}],
            "api_keys": [
                {"key": "k", "organization_id": "org-1"},
                {"key": "k", "organization_id": "org-1"}
            ]
        }"#;
        let err = MemoryApiKeyRepository::from_seed(CredentialSeed::from_json(json).unwrap())
            .unwrap_err();
        assert!(matches!(err, SeedError::DuplicateKey { index: 1 }));
    }

    #[test]
    fn seed_rejects_dangling_organization() {
        let json = r#"{"api_keys": [{"key": "k", "organization_id": "org-missing"}]}"#;
        let err = MemoryApiKeyRepository::from_seed(CredentialSeed::from_json(json).unwrap())
            .unwrap_err();
        assert!(matches!(err, SeedError::UnknownOrganization { index: 0, .. }));
    }

    #[test]
    fn seed_rejects_empty_key() {
        let json = r#"{"api_keys": [{"key": "", "organization_id": "org-1"}]}"#;
        assert!(matches!(
            CredentialSeed::from_json(json),
            Err(SeedError::Parse(_))
        ));
    }

    #[test]
    fn seed_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let repo = MemoryApiKeyRepository::from_seed_file(file.path()).unwrap();
        assert_eq!(repo.key_count(), 2);
    }

    #[test]
    fn missing_seed_file_reports_path() {
        let err = MemoryApiKeyRepository::from_seed_file(Path::new("/nonexistent/seed.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/seed.json"));
    }

    #[tokio::test]
    async fn insert_api_key_requires_parent() {
        let repo = MemoryApiKeyRepository::new();
        let record = ApiKeyRecord::new(key("k1"), OrganizationId::new("org-1").unwrap());
        assert!(repo.insert_api_key(record.clone()).is_err());

        repo.insert_organization(Organization {
            id: OrganizationId::new("org-1").unwrap(),
            name: "One".to_string(),
            email: "one@one.test".to_string(),
            created_at: chrono::Utc::now(),
            probability_multiplier: None,
        });
        repo.insert_api_key(record.clone()).unwrap();
        assert!(matches!(
            repo.insert_api_key(record),
            Err(SeedError::DuplicateKey { .. })
        ));
        assert_eq!(repo.find_by_key(&key("k1"), 1).await.unwrap().len(), 1);
    }
}
