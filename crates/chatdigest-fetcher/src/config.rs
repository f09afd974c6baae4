//! Configuration for the PageFetcher

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the PageFetcher
///
/// # Examples
///
/// ```
/// use chatdigest_fetcher::FetcherConfig;
///
/// let config = FetcherConfig::default();
/// assert_eq!(config.max_query_rounds, 35);
/// assert_eq!(config.page_size, 200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Maximum page requests per fetch, failed ones included
    #[serde(default = "default_max_query_rounds")]
    pub max_query_rounds: u32,

    /// Maximum messages returned by one fetch
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Messages requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Consecutive failed pages after which the fetch is abandoned
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Delay after a failed page (milliseconds)
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,

    /// Pause every this many rounds; 0 disables the pause
    #[serde(default = "default_courtesy_pause_every")]
    pub courtesy_pause_every: u32,

    /// Length of the courtesy pause (milliseconds)
    #[serde(default = "default_courtesy_pause_ms")]
    pub courtesy_pause_ms: u64,
}

fn default_max_query_rounds() -> u32 {
    35
}

fn default_max_messages() -> usize {
    1_000
}

fn default_page_size() -> usize {
    200
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_failure_backoff_ms() -> u64 {
    1_000
}

fn default_courtesy_pause_every() -> u32 {
    5
}

fn default_courtesy_pause_ms() -> u64 {
    500
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_query_rounds: default_max_query_rounds(),
            max_messages: default_max_messages(),
            page_size: default_page_size(),
            max_consecutive_failures: default_max_consecutive_failures(),
            failure_backoff_ms: default_failure_backoff_ms(),
            courtesy_pause_every: default_courtesy_pause_every(),
            courtesy_pause_ms: default_courtesy_pause_ms(),
        }
    }
}

impl FetcherConfig {
    /// Delay after a failed page as a Duration
    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }

    /// Courtesy pause as a Duration
    pub fn courtesy_pause(&self) -> Duration {
        Duration::from_millis(self.courtesy_pause_ms)
    }

    /// Same limits with every delay removed, for tests and replays
    pub fn without_delays(mut self) -> Self {
        self.failure_backoff_ms = 0;
        self.courtesy_pause_ms = 0;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_query_rounds == 0 {
            return Err("max_query_rounds must be greater than 0".to_string());
        }
        if self.max_messages == 0 {
            return Err("max_messages must be greater than 0".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be greater than 0".to_string());
        }
        if self.max_consecutive_failures == 0 {
            return Err("max_consecutive_failures must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FetcherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_limits() {
        let mut config = FetcherConfig::default();
        config.max_query_rounds = 0;
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.max_messages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FetcherConfig::from_toml("max_query_rounds = 10\nmax_messages = 500\n").unwrap();
        assert_eq!(config.max_query_rounds, 10);
        assert_eq!(config.max_messages, 500);
        assert_eq!(config.page_size, 200);
        assert_eq!(config.max_consecutive_failures, 3);

        let empty = FetcherConfig::from_toml("").unwrap();
        assert_eq!(empty, FetcherConfig::default());
    }

    #[test]
    fn test_without_delays() {
        let config = FetcherConfig::default().without_delays();
        assert_eq!(config.failure_backoff(), Duration::ZERO);
        assert_eq!(config.courtesy_pause(), Duration::ZERO);
        assert_eq!(config.max_query_rounds, 35);
    }
}
