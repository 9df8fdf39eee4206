//! Client configuration from the environment.
//!
//! Base URL: STORY_API_URL > API_BASE_URL > localhost default.
//! Timeouts bound the underlying transport only.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} (expected whole seconds)")]
    InvalidSeconds { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment. The binary loads
    /// `.env` into it at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STORY_API_URL")
            .or_else(|| lookup("API_BASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = seconds(&lookup, "STORY_API_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT);
        let connect_timeout = seconds(&lookup, "STORY_API_CONNECT_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout,
            connect_timeout,
        })
    }

    /// Override the base URL (e.g. from a CLI flag).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

fn seconds<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
    }
}
