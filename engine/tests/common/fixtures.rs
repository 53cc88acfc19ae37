//! Test fixtures and data for engine tests
//!
//! This module provides consistent requests, configurations and availability
//! answers used across all test suites.

use engine::EngineConfig;
use shared::{GeneratedName, RawAvailabilityResult, SearchRequest};
use std::collections::HashMap;
use std::time::Duration;

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Standard request values
    pub const KEYWORDS: &'static str = "solar coffee";
    pub const BUDGET: f64 = 50.0;
    pub const SEED: u64 = 7;

    /// Prices in micros
    pub const CHEAP: u64 = 20_000_000;
    pub const EXPENSIVE: u64 = 80_000_000;
    pub const BARGAIN: u64 = 9_000_000;

    /// Engine configuration with no pacing delays and a fixed seed
    pub fn config() -> EngineConfig {
        EngineConfig {
            generation_cooldown: Duration::ZERO,
            generation_jitter: Duration::ZERO,
            availability_concurrency: 4,
            availability_max_per_window: 10_000,
            availability_window: Duration::from_secs(60),
            seed: Some(Self::SEED),
            ..EngineConfig::default()
        }
    }

    /// Request for a single loop with the given quota
    pub fn request(max_names: u32, loop_count: u32) -> SearchRequest {
        SearchRequest {
            max_names,
            loop_count,
            ..SearchRequest::new(Self::KEYWORDS, Self::BUDGET)
        }
    }

    pub fn names(labels: &[&str]) -> Vec<GeneratedName> {
        labels.iter().map(|l| GeneratedName::new(*l)).collect()
    }

    /// alpha is cheap, beta is over budget and gamma is taken
    pub fn alpha_beta_gamma(domain: &str) -> RawAvailabilityResult {
        match domain {
            "alpha.com" => RawAvailabilityResult::available(domain, Self::CHEAP),
            "beta.com" => RawAvailabilityResult::available(domain, Self::EXPENSIVE),
            _ => RawAvailabilityResult::unavailable(domain, "registered"),
        }
    }

    /// Answer every domain through one classification function
    pub fn answer_all<F>(domains: &[String], classify: F) -> HashMap<String, RawAvailabilityResult>
    where
        F: Fn(&str) -> RawAvailabilityResult,
    {
        domains.iter().map(|d| (d.clone(), classify(d))).collect()
    }
}
