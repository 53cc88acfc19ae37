//! Trait definitions with mockall annotations for testing
//!
//! The engine reaches every external collaborator through these traits:
//! the name generator, the domain availability provider and the optimizer
//! model store. Production implementations live in `services`; tests use the
//! generated mocks.

use crate::error::EngineResult;
use shared::{GeneratedName, GenerationParams, OptimizerModelState, RawAvailabilityResult};
use std::collections::HashMap;

/// Everything a name generator needs for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub params: GenerationParams,
    pub blacklist: String,
    pub max_length: u8,
    pub tld: String,
    /// Number of names requested for this batch
    pub count: u32,
}

/// Source of raw candidate names
///
/// Implementations own their retry budget; an error returned here means the
/// source is unusable for this batch.
#[mockall::automock]
#[async_trait::async_trait]
pub trait NameGenerator: Send + Sync {
    /// Generate a batch of display names
    ///
    /// # Returns
    /// Names in generator order, possibly overlapping earlier batches
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<Vec<GeneratedName>>;
}

/// Bulk domain availability and pricing lookups
#[mockall::automock]
#[async_trait::async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Check a set of fully qualified domains
    ///
    /// # Parameters
    /// - `domains`: lowercase `label.tld` strings
    ///
    /// # Returns
    /// Results keyed by lowercase domain. Domains missing from the map were
    /// not answered by the provider.
    async fn check_bulk(&self, domains: &[String]) -> EngineResult<HashMap<String, RawAvailabilityResult>>;
}

/// Persistence for the bandit model shared across jobs
#[mockall::automock]
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    /// Load the current model, a fresh default when absent or unreadable
    async fn load(&self) -> OptimizerModelState;

    /// Persist the model atomically
    async fn save(&self, state: &OptimizerModelState) -> EngineResult<()>;
}
