//! Provider credentials from the environment
//!
//! Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values.
//!
//! ## Keys
//! - `AVAILABILITY_API_KEY`, `AVAILABILITY_API_SECRET`: availability provider credentials
//! - `AVAILABILITY_API_URL`: availability provider base URL
//! - `NAME_GENERATOR_URL`: endpoint of the name generator sidecar

use crate::error::{EngineError, EngineResult};

pub const AVAILABILITY_API_KEY: &str = "AVAILABILITY_API_KEY";
pub const AVAILABILITY_API_SECRET: &str = "AVAILABILITY_API_SECRET";
pub const AVAILABILITY_API_URL: &str = "AVAILABILITY_API_URL";
pub const NAME_GENERATOR_URL: &str = "NAME_GENERATOR_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub availability_api_key: Option<String>,
    pub availability_api_secret: Option<String>,
    pub availability_base_url: Option<String>,
    pub generator_url: Option<String>,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderCredentials {
    /// Read credentials, loading `.env` first if present
    pub fn from_env() -> Self {
        // silently ignored when no .env file exists
        let _ = dotenv::dotenv();
        Self {
            availability_api_key: non_empty(AVAILABILITY_API_KEY),
            availability_api_secret: non_empty(AVAILABILITY_API_SECRET),
            availability_base_url: non_empty(AVAILABILITY_API_URL),
            generator_url: non_empty(NAME_GENERATOR_URL),
        }
    }

    /// Key, secret and base URL of the availability provider
    pub fn availability(&self) -> EngineResult<(String, String, String)> {
        let missing = |field: &str| EngineError::Configuration {
            field: field.to_string(),
        };
        Ok((
            self.availability_api_key.clone().ok_or_else(|| missing(AVAILABILITY_API_KEY))?,
            self.availability_api_secret.clone().ok_or_else(|| missing(AVAILABILITY_API_SECRET))?,
            self.availability_base_url.clone().ok_or_else(|| missing(AVAILABILITY_API_URL))?,
        ))
    }

    pub fn generator(&self) -> EngineResult<String> {
        self.generator_url.clone().ok_or_else(|| EngineError::Configuration {
            field: NAME_GENERATOR_URL.to_string(),
        })
    }
}
