//! # Store Error Types

use thiserror::Error;

/// Failure of the storage engine itself.
///
/// Never carries the API key being looked up.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("store unreachable: {0}")]
    Unavailable(String),

    /// The backend was reached but the query failed.
    #[error("store query failed: {0}")]
    Query(String),

    /// The lookup did not complete before its deadline.
    #[error("store lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

/// Outcome classes of resolving an API key.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No record matches the presented key. Deliberately carries no detail.
    #[error("invalid credential")]
    InvalidCredential,

    /// The store could not answer.
    #[error("credential store unavailable")]
    StoreUnavailable(#[source] BackendError),
}

/// Errors loading a seed document into the in-memory store.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The seed document is not valid JSON of the expected shape.
    #[error("invalid seed document: {0}")]
    Parse(String),

    /// Two API-key records share the same key value. Only the position is
    /// reported.
    #[error("duplicate api key at api_keys[{index}]")]
    DuplicateKey { index: usize },

    /// An API-key record references an organization that is not seeded.
    #[error("api_keys[{index}] references unknown organization {organization_id}")]
    UnknownOrganization {
        index: usize,
        organization_id: String,
    },
}
