//! # tokex-core — Foundational Types for the Token Exchange Service
//!
//! Defines the identifiers and records shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `OrganizationId`, `ApiKey`,
//!    `KeyId`, `TokenId` are distinct types with validated constructors.
//!    An API key cannot be passed where an organization id is expected.
//!
//! 2. **Secrets redact themselves.** `ApiKey` never prints its value through
//!    `Debug` or `Display`, so it cannot leak into logs by accident.
//!
//! 3. **Explicit parent references.** `ApiKeyRecord` carries the owning
//!    organization as a plain reference field instead of relying on a
//!    store-specific key hierarchy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tokex-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod records;

// Re-export primary types for ergonomic imports.
pub use error::ValidationError;
pub use identity::{ApiKey, KeyId, OrganizationId, TokenId, MAX_API_KEY_LEN};
pub use records::{ApiKeyRecord, Organization};
