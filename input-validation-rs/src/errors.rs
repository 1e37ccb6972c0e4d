//! Error handling for the validation library
//!
//! Every failure names the field it was raised for (dotted path, `$` for
//! the document root) and a structured reason.

use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Why a field was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationReason {
    /// Required field is absent or null
    #[error("required field is missing")]
    Missing,

    /// Value has the wrong type even after normalization
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Numeric value is outside the declared range
    #[error("value is outside allowed range: {0}")]
    OutOfRange(String),

    /// String could not be interpreted (dates, amounts)
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("input is shorter than minimum length: {0}")]
    TooShort(String),

    #[error("input exceeds maximum length: {0}")]
    TooLong(String),

    /// Text did not contain a JSON document
    #[error("no structured data found: {0}")]
    Unparsable(String),

    /// Sequence has the wrong number of entries
    #[error("expected {expected} entries, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    /// Sequence indices are not a strict 1..N run
    #[error("out of sequence: {0}")]
    OutOfSequence(String),
}

/// A rejected field and the reason
#[derive(Error, Debug, Clone, PartialEq)]
#[error("ValidationError at '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new<S: Into<String>>(field: S, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    pub fn missing<S: Into<String>>(field: S) -> Self {
        Self::new(field, ValidationReason::Missing)
    }

    pub fn invalid_type<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self::new(field, ValidationReason::InvalidType(message.into()))
    }

    pub fn out_of_range<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self::new(field, ValidationReason::OutOfRange(message.into()))
    }

    pub fn invalid_format<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self::new(field, ValidationReason::InvalidFormat(message.into()))
    }

    /// Re-root the error under a parent path, e.g. `activities` -> `days[2].activities`
    pub fn within(mut self, parent: &str) -> Self {
        if parent.is_empty() {
            return self;
        }
        self.field = if self.field == "$" {
            parent.to_string()
        } else if self.field.starts_with('[') {
            format!("{}{}", parent, self.field)
        } else {
            format!("{}.{}", parent, self.field)
        };
        self
    }
}
