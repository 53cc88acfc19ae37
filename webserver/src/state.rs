//! Webserver state management

use std::net::SocketAddr;
use std::time::Instant;

/// Process-level facts reported by the health endpoint
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            server_start_time: Instant::now(),
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }
}
