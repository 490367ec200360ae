//! Database settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where folders and documents are stored.
///
/// A `paperhub` invocation runs one command and exits, so the pool only
/// needs a handful of connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a command waits for a connection before failing.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// `acquire_timeout_seconds` as a [`Duration`].
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

fn default_max_connections() -> u32 {
    4
}

fn default_acquire_timeout() -> u64 {
    10
}
