//! PostgreSQL settings for the `postgres` store backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Connection pool settings. Ignored by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// How long to wait for a connection, in seconds.
    pub connect_timeout_seconds: u64,
    /// How long an idle connection may live, in seconds.
    pub idle_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Acquire timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }

    /// Reject pool bounds that sqlx would refuse or silently clamp.
    pub fn check(&self) -> Result<(), AppError> {
        if self.url.trim().is_empty() {
            return Err(AppError::configuration("database.url is empty"));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(AppError::configuration(format!(
                "database pool bounds are invalid: min {} max {}",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/lostfound".to_string(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 300,
        }
    }
}
