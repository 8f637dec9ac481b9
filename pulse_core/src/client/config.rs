use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::types::types::{ProgressError, Result};

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

pub const CONNECT_TIMEOUT_ENV: &str = "PULSE_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_ENV: &str = "PULSE_READ_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "PULSE_USER_AGENT";

/// Transport settings for the HTTP client that feeds tracked bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub connect_timeout: Duration,
    /// Maximum idle time between two reads of a response body.
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            user_agent: format!("pulse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `PULSE_CONNECT_TIMEOUT_SECS`,
    /// `PULSE_READ_TIMEOUT_SECS` and `PULSE_USER_AGENT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(CONNECT_TIMEOUT_ENV) {
            config.connect_timeout = parse_secs(CONNECT_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(READ_TIMEOUT_ENV) {
            config.read_timeout = parse_secs(READ_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = lookup(USER_AGENT_ENV) {
            config.user_agent = value;
        }
        Ok(config)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build_client(&self) -> Result<Client> {
        log::debug!(
            "[ClientConfig] building client: connect_timeout={:?}, read_timeout={:?}",
            self.connect_timeout,
            self.read_timeout
        );
        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .user_agent(self.user_agent.as_str())
            .build()?;
        Ok(client)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ProgressError::InvalidConfig(format!("{}={:?}: {}", key, value, e)))
}
