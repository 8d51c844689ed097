//! Storage-engine boundary for API-key records.

use async_trait::async_trait;
use tokex_core::{ApiKey, ApiKeyRecord};

use crate::error::BackendError;

/// Read access to stored API-key records.
///
/// Implementations compare the key value exactly and case-sensitively; no
/// prefix or pattern matching. They are shared across concurrent requests
/// and must not add caching or locking beyond what the backend needs.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Return at most `limit` records whose key equals `key`.
    ///
    /// An empty result is not an error.
    async fn find_by_key(
        &self,
        key: &ApiKey,
        limit: usize,
    ) -> Result<Vec<ApiKeyRecord>, BackendError>;

    /// Short backend name for startup logs.
    fn backend_name(&self) -> &'static str;
}
