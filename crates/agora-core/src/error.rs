//! # Error Types — Validation Failures for Core Primitives
//!
//! Errors produced while constructing core domain primitives. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Value-transfer and reentrancy failures have their own types
//! ([`crate::bank::BankError`], [`crate::guard::ReentrancyError`]) because
//! the ledgers handle them on different paths than construction-time
//! validation.

use thiserror::Error;

/// Validation error for core domain primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier failed format validation at construction.
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp could not be constructed from the given input.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A hex digest string was malformed.
    #[error("invalid digest {value:?}: {reason}")]
    InvalidDigest {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
