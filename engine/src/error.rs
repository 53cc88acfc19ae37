//! Engine-specific error types

use shared::{JobError, ValidationError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Name generation failed after {attempts} attempt(s): {message}")]
    Generation { attempts: u32, message: String },

    #[error("Availability provider rejected credentials: {message}")]
    AvailabilityAuth { message: String },

    #[error("Availability provider rate limit persisted after {attempts} attempt(s)")]
    AvailabilityRateLimited {
        attempts: u32,
        retry_after: Option<Duration>,
    },

    #[error("Availability provider error: {message}")]
    AvailabilityApi { status: Option<u16>, message: String },

    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("Model persistence failed for {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Configuration error: {field}")]
    Configuration { field: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::Internal {
            message: message.into(),
        }
    }

    /// Stable code carried by a failed job
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Generation { .. } => "GENERATION_ERROR",
            EngineError::AvailabilityAuth { .. } => "AVAILABILITY_AUTH_ERROR",
            EngineError::AvailabilityRateLimited { .. } => "AVAILABILITY_RATE_LIMITED",
            EngineError::AvailabilityApi { .. } => "AVAILABILITY_API_ERROR",
            EngineError::JobNotFound { .. } => "JOB_NOT_FOUND",
            EngineError::Persistence { .. }
            | EngineError::Configuration { .. }
            | EngineError::Internal { .. }
            | EngineError::Io(_)
            | EngineError::Json(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<&EngineError> for JobError {
    fn from(error: &EngineError) -> Self {
        JobError {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases = [
            (
                EngineError::from(ValidationError::invalid("tld", "bad")),
                "VALIDATION_ERROR",
            ),
            (
                EngineError::Generation {
                    attempts: 3,
                    message: "down".into(),
                },
                "GENERATION_ERROR",
            ),
            (
                EngineError::AvailabilityAuth {
                    message: "401".into(),
                },
                "AVAILABILITY_AUTH_ERROR",
            ),
            (
                EngineError::AvailabilityRateLimited {
                    attempts: 5,
                    retry_after: None,
                },
                "AVAILABILITY_RATE_LIMITED",
            ),
            (
                EngineError::AvailabilityApi {
                    status: Some(500),
                    message: "boom".into(),
                },
                "AVAILABILITY_API_ERROR",
            ),
            (EngineError::internal("panic"), "INTERNAL_ERROR"),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_job_error_conversion() {
        let error = EngineError::Generation {
            attempts: 3,
            message: "generator returned nothing".into(),
        };
        let job_error = JobError::from(&error);
        assert_eq!(job_error.code, "GENERATION_ERROR");
        assert!(job_error.message.contains("generator returned nothing"));
    }
}
