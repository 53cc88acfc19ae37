//! Core types used throughout the discovery system

pub mod domain;
pub mod job;
pub mod optimizer;
pub mod request;

pub use domain::*;
pub use job::*;
pub use optimizer::*;
pub use request::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identifier for the binary currently emitting logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Command-line search runner
    Engine,
    /// HTTP job API
    WebServer,
}

impl ProcessId {
    /// Initialize the global process ID for the CLI engine
    pub fn init_engine() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Engine)
    }

    /// Initialize the global process ID for the webserver
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    /// Get the global process ID, defaulting to the engine when uninitialized
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Engine)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Engine => write!(f, "engine"),
            ProcessId::WebServer => write!(f, "webserver"),
        }
    }
}

/// Round to two decimal places, the precision of every published score
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
