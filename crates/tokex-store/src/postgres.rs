//! # PostgreSQL Credential Backend
//!
//! Reads API-key records from a PostgreSQL database via SQLx. The store
//! namespace maps to a Postgres schema, so several deployments can share a
//! database. Expected tables:
//!
//! ```sql
//! CREATE TABLE <namespace>.organizations (
//!     id                     TEXT PRIMARY KEY,
//!     name                   TEXT NOT NULL,
//!     email                  TEXT NOT NULL,
//!     created_at             TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     probability_multiplier DOUBLE PRECISION
//! );
//!
//! CREATE TABLE <namespace>.api_keys (
//!     key             TEXT PRIMARY KEY,
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     organization_id TEXT NOT NULL REFERENCES <namespace>.organizations (id)
//! );
//! ```
//!
//! Provisioning these tables is the operator's job; this crate only reads.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokex_core::{ApiKey, ApiKeyRecord, OrganizationId};

use crate::error::BackendError;
use crate::repository::ApiKeyRepository;

/// Default store namespace.
pub const DEFAULT_NAMESPACE: &str = "credentials";

const MAX_NAMESPACE_LEN: usize = 63;

/// A validated Postgres schema name: `[a-z_][a-z0-9_]*`, at most 63 bytes.
///
/// The name is interpolated into SQL text, so nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNamespace(String);

impl StoreNamespace {
    /// Validate a namespace name.
    pub fn new(name: impl Into<String>) -> Result<Self, BackendError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_lowercase());
        let valid_rest = chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit());
        if !valid_start || !valid_rest || name.len() > MAX_NAMESPACE_LEN {
            return Err(BackendError::Query(format!(
                "invalid store namespace {name:?}: expected [a-z_][a-z0-9_]*"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StoreNamespace {
    fn default() -> Self {
        Self(DEFAULT_NAMESPACE.to_string())
    }
}

impl std::fmt::Display for StoreNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    key: String,
    created_at: DateTime<Utc>,
    organization_id: String,
}

impl ApiKeyRow {
    fn into_record(self) -> Result<ApiKeyRecord, BackendError> {
        let key = ApiKey::new(self.key)
            .map_err(|e| BackendError::Query(format!("stored api key is invalid: {e}")))?;
        let organization_id = OrganizationId::new(self.organization_id)
            .map_err(|e| BackendError::Query(format!("stored organization id is invalid: {e}")))?;
        Ok(ApiKeyRecord {
            key,
            created_at: self.created_at,
            organization_id,
        })
    }
}

/// PostgreSQL [`ApiKeyRepository`].
#[derive(Debug, Clone)]
pub struct PgApiKeyRepository {
    pool: PgPool,
    namespace: StoreNamespace,
    lookup_sql: String,
}

impl PgApiKeyRepository {
    /// Connect to `url` and read from `namespace`.
    pub async fn connect(url: &str, namespace: StoreNamespace) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!(namespace = %namespace, "Connected to PostgreSQL");
        Ok(Self::from_pool(pool, namespace))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool, namespace: StoreNamespace) -> Self {
        let lookup_sql = lookup_sql(&namespace);
        Self {
            pool,
            namespace,
            lookup_sql,
        }
    }

    pub fn namespace(&self) -> &StoreNamespace {
        &self.namespace
    }
}

fn lookup_sql(namespace: &StoreNamespace) -> String {
    format!(
        "SELECT key, created_at, organization_id FROM \"{namespace}\".api_keys \
         WHERE key = $1 LIMIT $2"
    )
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn find_by_key(
        &self,
        key: &ApiKey,
        limit: usize,
    ) -> Result<Vec<ApiKeyRecord>, BackendError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ApiKeyRow>(&self.lookup_sql)
            .bind(key.expose())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ApiKeyRow::into_record).collect()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_accepts_schema_names() {
        for name in ["credentials", "_private", "tenant_2"] {
            assert_eq!(StoreNamespace::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn namespace_rejects_injection_and_case() {
        for name in ["", "2fast", "Credentials", "a-b", "x\"; DROP TABLE y; --", "a.b"] {
            assert!(StoreNamespace::new(name).is_err(), "{name:?} accepted");
        }
        assert!(StoreNamespace::new("a".repeat(64)).is_err());
    }

    #[test]
    fn default_namespace() {
        assert_eq!(StoreNamespace::default().as_str(), DEFAULT_NAMESPACE);
    }

    #[test]
    fn lookup_query_is_exact_match_and_limited() {
        let sql = lookup_sql(&StoreNamespace::default());
        assert!(sql.contains("FROM \"credentials\".api_keys"));
        assert!(sql.contains("WHERE key = $1"));
        assert!(sql.contains("LIMIT $2"));
        assert!(!sql.to_lowercase().contains("like"));
    }

    #[test]
    fn row_conversion_takes_parent_reference() {
        let row = ApiKeyRow {
            key: "abc123".to_string(),
            created_at: Utc::now(),
            organization_id: "org-42".to_string(),
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.organization_id.as_str(), "org-42");
    }

    #[test]
    fn row_with_blank_organization_is_query_error() {
        let row = ApiKeyRow {
            key: "abc123".to_string(),
            created_at: Utc::now(),
            organization_id: "  ".to_string(),
        };
        assert!(matches!(row.into_record(), Err(BackendError::Query(_))));
    }

    #[tokio::test]
    async fn unreachable_database_is_unavailable() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://tokex@127.0.0.1:1/tokex")
            .unwrap();
        let repo = PgApiKeyRepository::from_pool(pool, StoreNamespace::default());
        let err = repo
            .find_by_key(&ApiKey::new("abc123").unwrap(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)), "{err:?}");
    }
}
