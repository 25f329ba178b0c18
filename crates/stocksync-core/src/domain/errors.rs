//! Domain error types
//!
//! Validation failures raised before any I/O takes place. A `DomainError`
//! never reaches the network: repositories check drafts and patches first.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is empty or missing
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field carries a value outside its allowed range or shape
    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        /// Field name as it appears in the record (camelCase)
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Identifier parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Unknown entity kind name
    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidField`]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
