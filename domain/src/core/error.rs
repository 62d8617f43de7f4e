//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Raised when a value would break an invariant of the council's records.
/// These are always caller errors: nothing has been written when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Only awarded proposals can have an awarded amount or awarded date (status: {status})")]
    AwardOnNonAwarded { status: String },

    #[error("Requested amount must be a positive number, got {0}")]
    NonPositiveAmount(f64),

    #[error("Awarded amount must be a non-negative number, got {0}")]
    InvalidAwardAmount(f64),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(String),

    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl DomainError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
