//! Shared types for the namescout domain discovery system
//!
//! Contains the data model exchanged between the engine, its adapters and the
//! HTTP job API, plus request validation errors and logging helpers.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
