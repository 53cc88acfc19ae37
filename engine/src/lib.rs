//! Discovery engine for finding affordable, marketable domain names
//!
//! This library runs iterative search jobs: each job generates candidate names,
//! checks their availability and price, scores and ranks them against a yearly
//! budget, and tunes the generation parameters of the next loop from the
//! quality of the previous one.

pub mod config;
pub mod core;
pub mod error;
pub mod jobs;
pub mod search;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{EngineArgs, EngineConfig, ProviderMode};
pub use error::{EngineError, EngineResult};
pub use jobs::{JobPatch, JobRegistry};
pub use search::SearchEngine;
pub use services::build_engine;
pub use traits::{AvailabilityProvider, GenerationRequest, ModelStore, NameGenerator};
