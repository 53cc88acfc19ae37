//! Service implementations
//!
//! Production implementations of the engine's collaborator traits, plus the
//! rate-limited queues and retry timing they share.

pub mod availability;
pub mod credentials;
pub mod model_store;
pub mod name_generator;
pub mod rate_limiter;
pub mod retry;

#[cfg(test)]
mod tests;

pub use availability::{HttpAvailabilityProvider, SimulatedAvailabilityProvider};
pub use credentials::ProviderCredentials;
pub use model_store::FileModelStore;
pub use name_generator::{HttpNameGenerator, RandomNameGenerator};
pub use rate_limiter::{chunk_domains, CooldownQueue, WindowedQueue};
pub use retry::RetryPolicy;

use crate::config::{EngineConfig, ProviderMode};
use crate::error::EngineResult;
use crate::search::SearchEngine;
use crate::traits::{AvailabilityProvider, NameGenerator};
use shared::{process_debug, ProcessId};
use std::sync::Arc;
use std::time::Duration;

/// Wire the collaborators for `mode` into a ready engine
///
/// Offline mode has no upstream to protect, so its generation cooldown is
/// dropped.
pub fn build_engine(mode: ProviderMode, mut config: EngineConfig) -> EngineResult<SearchEngine> {
    let generator: Arc<dyn NameGenerator>;
    let availability: Arc<dyn AvailabilityProvider>;

    match mode {
        ProviderMode::Random => {
            process_debug!(ProcessId::current(), "🎲 Random provider mode enabled, using offline services");
            config.generation_cooldown = Duration::ZERO;
            config.generation_jitter = Duration::ZERO;
            generator = match config.seed {
                Some(seed) => Arc::new(RandomNameGenerator::with_seed(seed)),
                None => Arc::new(RandomNameGenerator::new()),
            };
            availability = Arc::new(SimulatedAvailabilityProvider::default());
        }
        ProviderMode::Env => {
            let credentials = ProviderCredentials::from_env();
            let (key, secret, url) = credentials.availability()?;
            generator = Arc::new(HttpNameGenerator::new(credentials.generator()?)?);
            availability = Arc::new(HttpAvailabilityProvider::new(url, &key, &secret)?);
        }
    }

    let store = Arc::new(FileModelStore::new(config.model_path.clone()));
    process_debug!(ProcessId::current(), "💾 Optimizer model at {}", store.path().display());
    Ok(SearchEngine::new(config, generator, availability, store))
}
