//! Engine configuration
//!
//! `EngineConfig` carries every tunable of the discovery engine. Binaries build
//! it from `EngineArgs`, a clap argument group that falls back to environment
//! variables.

use crate::error::{EngineError, EngineResult};
use std::path::PathBuf;
use std::time::Duration;

/// Distinct names a single loop may consider before giving up
pub const CONSIDERED_NAME_CAP: usize = 251;

/// Upper bound on names requested from the generator in one batch
pub const MAX_BATCH_NAMES: u32 = 250;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum gap between the end of one generation call and the start of the next
    pub generation_cooldown: Duration,
    /// Uniform random extra delay added to the cooldown
    pub generation_jitter: Duration,
    pub availability_concurrency: usize,
    /// Availability calls allowed to start per rolling window
    pub availability_max_per_window: usize,
    pub availability_window: Duration,
    pub availability_chunk_size: usize,
    /// Configured generation batch size before quota scaling
    pub max_generation_batch: u32,
    pub considered_cap: usize,
    pub max_batches_per_loop: u32,
    /// Consecutive batches without a new qualifying candidate before a loop stops
    pub stall_limit: u32,
    pub job_retention: Duration,
    pub sweep_interval: Duration,
    pub model_path: PathBuf,
    /// Fixed optimizer seed; a fresh random seed per job when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_cooldown: Duration::from_millis(2_500),
            generation_jitter: Duration::from_millis(1_000),
            availability_concurrency: 4,
            availability_max_per_window: 55,
            availability_window: Duration::from_secs(60),
            availability_chunk_size: 50,
            max_generation_batch: 80,
            considered_cap: CONSIDERED_NAME_CAP,
            max_batches_per_loop: 12,
            stall_limit: 3,
            job_retention: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(60),
            model_path: PathBuf::from("data/optimizer-model.json"),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Reject settings that would deadlock the queues or stall every loop
    pub fn validate(&self) -> EngineResult<()> {
        let checks = [
            (self.availability_concurrency == 0, "availability_concurrency"),
            (self.availability_max_per_window == 0, "availability_max_per_window"),
            (self.availability_window.is_zero(), "availability_window"),
            (self.availability_chunk_size == 0, "availability_chunk_size"),
            (self.max_generation_batch == 0, "max_generation_batch"),
            (self.considered_cap == 0, "considered_cap"),
            (self.max_batches_per_loop == 0, "max_batches_per_loop"),
            (self.stall_limit == 0, "stall_limit"),
        ];
        match checks.iter().find(|(bad, _)| *bad) {
            Some((_, field)) => Err(EngineError::Configuration {
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Which collaborator implementations a binary wires in
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// Offline generator and simulated availability
    #[default]
    Random,
    /// HTTP generator sidecar and availability API from the environment
    Env,
}

/// Command-line and environment overrides shared by the binaries
#[derive(clap::Args, Debug, Clone)]
pub struct EngineArgs {
    /// Provider selection (random uses offline services, env uses configured HTTP services)
    #[arg(long, value_enum, env = "NAMESCOUT_PROVIDER", default_value = "random")]
    pub provider: ProviderMode,

    /// Milliseconds between generation calls
    #[arg(long, env = "NAMESCOUT_GENERATION_COOLDOWN_MS", default_value = "2500")]
    pub generation_cooldown_ms: u64,

    /// Maximum random jitter added to the generation cooldown
    #[arg(long, env = "NAMESCOUT_GENERATION_JITTER_MS", default_value = "1000")]
    pub generation_jitter_ms: u64,

    /// Concurrent availability requests
    #[arg(long, env = "NAMESCOUT_AVAILABILITY_CONCURRENCY", default_value = "4")]
    pub availability_concurrency: usize,

    /// Availability requests allowed per window
    #[arg(long, env = "NAMESCOUT_AVAILABILITY_PER_WINDOW", default_value = "55")]
    pub availability_per_window: usize,

    /// Length of the availability rate window in seconds
    #[arg(long, env = "NAMESCOUT_AVAILABILITY_WINDOW_SECS", default_value = "60")]
    pub availability_window_secs: u64,

    /// Domains per availability request
    #[arg(long, env = "NAMESCOUT_AVAILABILITY_CHUNK", default_value = "50")]
    pub availability_chunk_size: usize,

    /// Configured names per generation batch
    #[arg(long, env = "NAMESCOUT_BATCH_SIZE", default_value = "80")]
    pub batch_size: u32,

    /// Minutes a finished job stays pollable
    #[arg(long, env = "NAMESCOUT_JOB_RETENTION_MINS", default_value = "60")]
    pub job_retention_mins: u64,

    /// Path of the persisted optimizer model
    #[arg(long, env = "NAMESCOUT_MODEL_PATH", default_value = "data/optimizer-model.json")]
    pub model_path: PathBuf,

    /// Fixed optimizer seed for reproducible runs
    #[arg(long, env = "NAMESCOUT_SEED")]
    pub seed: Option<u64>,
}

impl EngineArgs {
    pub fn into_config(self) -> EngineResult<EngineConfig> {
        let config = EngineConfig {
            generation_cooldown: Duration::from_millis(self.generation_cooldown_ms),
            generation_jitter: Duration::from_millis(self.generation_jitter_ms),
            availability_concurrency: self.availability_concurrency,
            availability_max_per_window: self.availability_per_window,
            availability_window: Duration::from_secs(self.availability_window_secs),
            availability_chunk_size: self.availability_chunk_size,
            max_generation_batch: self.batch_size,
            job_retention: Duration::from_secs(self.job_retention_mins * 60),
            model_path: self.model_path,
            seed: self.seed,
            ..EngineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
