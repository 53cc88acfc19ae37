//! Core business logic modules
//!
//! This module contains pure business logic with no I/O dependencies.
//! Everything here is deterministic for a given seed and easily testable.

pub mod aggregator;
pub mod bandit;
pub mod normalizer;
pub mod scorer;
pub mod tokens;

pub use aggregator::{apply_query, DomainAggregator, MergeStats};
pub use bandit::{loop_reward, BanditOptimizer, LoopPlan};
pub use normalizer::{normalize_batch, normalize_name, NormalizedBatch};
pub use scorer::score;
