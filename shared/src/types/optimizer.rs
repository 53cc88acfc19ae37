//! Persisted bandit model state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average assumed for an arm that has never been played
pub const OPTIMISTIC_PRIOR: f64 = 0.55;

/// Current on-disk model layout
pub const MODEL_VERSION: u32 = 1;

/// Play count and cumulative reward of one arm or token
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pub plays: u64,
    pub total_reward: f64,
}

impl ArmStats {
    pub fn average(&self) -> f64 {
        if self.plays == 0 {
            OPTIMISTIC_PRIOR
        } else {
            self.total_reward / self.plays as f64
        }
    }

    /// Accumulate one reward, clamped to [0, 1]
    pub fn record(&mut self, reward: f64) {
        let reward = if reward.is_nan() { 0.0 } else { reward.clamp(0.0, 1.0) };
        self.plays += 1;
        self.total_reward += reward;
    }
}

/// Everything the bandit learns across jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerModelState {
    pub version: u32,
    pub runs: u64,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub style: BTreeMap<String, ArmStats>,
    #[serde(default)]
    pub randomness: BTreeMap<String, ArmStats>,
    #[serde(default)]
    pub mutation: BTreeMap<String, ArmStats>,
    #[serde(default)]
    pub tokens: BTreeMap<String, ArmStats>,
}

impl Default for OptimizerModelState {
    fn default() -> Self {
        Self {
            version: MODEL_VERSION,
            runs: 0,
            updated_at: None,
            style: BTreeMap::new(),
            randomness: BTreeMap::new(),
            mutation: BTreeMap::new(),
            tokens: BTreeMap::new(),
        }
    }
}
