//! Shared error types for the discovery system

use thiserror::Error;

/// Caller-correctable problem with a search request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Invalid {field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
}

impl ValidationError {
    pub fn invalid(field: &str, message: &str) -> Self {
        ValidationError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn out_of_range<T: ToString>(field: &str, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            ValidationError::Invalid { field, .. } | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
