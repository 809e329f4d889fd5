//! Domain error taxonomy.
//!
//! These errors describe caller mistakes or missing on-chain state. They are
//! never retried and their messages are meant to reach the end user verbatim.

use thiserror::Error;

/// Errors raised by the pure range, quote and composition logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A pool or position account is absent or could not be parsed.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A range is degenerate or not aligned to the pool's spacing unit.
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    /// An amount is non-positive or cannot be used for the requested side.
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),
    /// A value does not fit the numeric type used to represent it.
    #[error("Overflow: {0}")]
    Overflow(String),
}

impl DomainError {
    /// Creates a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates an `InvalidRange` error.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        Self::InvalidRange(reason.into())
    }

    /// Creates an `InsufficientInput` error.
    pub fn insufficient_input(reason: impl Into<String>) -> Self {
        Self::InsufficientInput(reason.into())
    }

    /// Creates an `Overflow` error.
    pub fn overflow(reason: impl Into<String>) -> Self {
        Self::Overflow(reason.into())
    }
}

/// Convenience result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DomainError::invalid_range("lower 10 >= upper 10");
        assert_eq!(err.to_string(), "Invalid range: lower 10 >= upper 10");

        let err = DomainError::insufficient_input("amount must be positive");
        assert!(err.to_string().starts_with("Insufficient input"));
    }
}
