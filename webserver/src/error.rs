//! WebServer-specific error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use engine::EngineError;
use serde_json::json;
use shared::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request format: {details}")]
    InvalidRequest { details: String },

    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error(transparent)]
    Engine(EngineError),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<EngineError> for WebServerError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Validation(error) => WebServerError::Validation(error),
            EngineError::JobNotFound { job_id } => WebServerError::JobNotFound { job_id },
            other => WebServerError::Engine(other),
        }
    }
}

impl WebServerError {
    pub fn invalid(details: impl Into<String>) -> Self {
        WebServerError::InvalidRequest {
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebServerError::Validation(_) | WebServerError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            WebServerError::JobNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WebServerError::Validation(_) | WebServerError::InvalidRequest { .. } => "VALIDATION_ERROR",
            WebServerError::JobNotFound { .. } => "JOB_NOT_FOUND",
            WebServerError::Engine(error) => error.code(),
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let field = match &self {
            WebServerError::Validation(error) => Some(error.field().to_string()),
            _ => None,
        };
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "field": field,
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
