//! Webserver library for the namescout search engine
//!
//! This library exposes search job submission, polling and a health check
//! over HTTP, backed by one in-process `SearchEngine`.

pub mod error;
pub mod state;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use webserver_impl::{LeaderboardParams, WebServer};
