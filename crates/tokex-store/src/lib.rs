//! # tokex-store: API-Key Credential Store
//!
//! Resolves an opaque API key to the identifier of the organization that
//! owns it.
//!
//! ## Layers
//!
//! - [`ApiKeyRepository`]: the storage-engine boundary. "Query API-key
//!   records by exact key value, return at most N." Implemented by
//!   [`MemoryApiKeyRepository`] and [`PgApiKeyRepository`].
//! - [`CredentialStore`]: the resolution policy on top. Limits the query to
//!   one record, applies the lookup deadline, and collapses every "no such
//!   key" outcome into a single generic [`CredentialError::InvalidCredential`].
//!
//! The organization identifier always comes from the record's parent
//! reference, never from the key value.

pub mod credential_store;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use credential_store::{CredentialStore, DEFAULT_LOOKUP_TIMEOUT};
pub use error::{BackendError, CredentialError, SeedError};
pub use memory::{CredentialSeed, MemoryApiKeyRepository};
pub use postgres::{PgApiKeyRepository, StoreNamespace, DEFAULT_NAMESPACE};
pub use repository::ApiKeyRepository;
