//! Service-specific tests
//!
//! HTTP adapters run against a local wiremock server; the model store runs
//! against a temp directory.

#[cfg(test)]
mod availability;
#[cfg(test)]
mod name_generator;

// Common test utilities for services
#[cfg(test)]
pub mod common {
    use shared::{GenerationParams, MutationIntensity, NameStyle, Randomness};

    use crate::traits::GenerationRequest;

    pub const TEST_KEY: &str = "test-key";
    pub const TEST_SECRET: &str = "test-secret";

    /// Generation request for the default test keywords
    pub fn generation_request(count: u32) -> GenerationRequest {
        GenerationRequest {
            params: GenerationParams {
                style: NameStyle::Brandable,
                randomness: Randomness::High,
                mutation: MutationIntensity::Medium,
                keywords: "solar coffee".to_string(),
                description: "morning brew".to_string(),
            },
            blacklist: "bean".to_string(),
            max_length: 12,
            tld: "com".to_string(),
            count,
        }
    }

    pub fn domains(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| format!("{l}.com")).collect()
    }
}
