//! # Error Types
//!
//! Validation errors raised by the identifier constructors in
//! [`crate::identity`]. All errors use `thiserror`.

use thiserror::Error;

/// Rejection reason for a malformed identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The identifier was empty or whitespace-only.
    #[error("{kind} must not be empty")]
    Empty {
        /// Which identifier was being validated.
        kind: &'static str,
    },

    /// The identifier exceeded its maximum length.
    #[error("{kind} exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Which identifier was being validated.
        kind: &'static str,
        /// Maximum accepted length in bytes.
        max: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// The identifier contained control characters.
    #[error("{kind} contains control characters")]
    ControlCharacters {
        /// Which identifier was being validated.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_display_names_kind() {
        let err = ValidationError::Empty { kind: "organization id" };
        assert_eq!(err.to_string(), "organization id must not be empty");
    }

    #[test]
    fn too_long_display_includes_lengths() {
        let err = ValidationError::TooLong {
            kind: "api key",
            max: 512,
            actual: 600,
        };
        let msg = err.to_string();
        assert!(msg.contains("512"));
        assert!(msg.contains("600"));
    }
}
