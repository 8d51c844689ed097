//! # Credential Records
//!
//! The durable relation "API key belongs to organization". An
//! [`ApiKeyRecord`] is a child of its [`Organization`]; the relationship is
//! an explicit reference field so that store backends need not share a key
//! hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{ApiKey, OrganizationId};

/// An organization that owns API keys.
///
/// The exchange only consumes [`Organization::id`]; the remaining fields are
/// owned by whoever provisions organizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub email: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Domain-specific weighting value. Absent for most organizations.
    #[serde(default)]
    pub probability_multiplier: Option<f64>,
}

/// A stored API key and a reference to its parent organization.
///
/// Does not implement `Serialize`: the key value must not be written back
/// out of the process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiKeyRecord {
    pub key: ApiKey,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Parent organization reference.
    pub organization_id: OrganizationId,
}

impl ApiKeyRecord {
    /// Create a record for `key` owned by `organization_id`, created now.
    pub fn new(key: ApiKey, organization_id: OrganizationId) -> Self {
        Self {
            key,
            created_at: Utc::now(),
            organization_id,
        }
    }
}
