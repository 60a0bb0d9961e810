//! # Error Types
//!
//! Errors raised when constructing shared value objects.

use thiserror::Error;

/// Errors produced by value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// An identifier was empty or whitespace only.
    #[error("{kind} must not be empty")]
    EmptyIdentifier { kind: &'static str },

    /// An identifier exceeded the maximum length.
    #[error("{kind} exceeds {max} characters")]
    IdentifierTooLong { kind: &'static str, max: usize },

    /// Lot number is not a numeric prefix with an optional alphabetic suffix.
    #[error("invalid lot number '{value}': expected digits optionally followed by letters (e.g. 12, 12A)")]
    InvalidLotNumber { value: String },

    /// Attribute key is not of the form `namespace.name`.
    #[error("invalid attribute key '{key}': expected lowercase 'namespace.name'")]
    InvalidAttributeKey { key: String },

    /// Estimate low bound is above the high bound.
    #[error("estimate low ({low}) exceeds estimate high ({high})")]
    InvertedEstimate { low: u64, high: u64 },
}
