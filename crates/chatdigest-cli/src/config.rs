//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use chatdigest_analyzer::AnalyzerConfig;
use chatdigest_fetcher::onebot::DEFAULT_TIMEOUT_SECS;
use chatdigest_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat platform connection
    #[serde(default)]
    pub onebot: OneBotSettings,

    /// LLM provider
    #[serde(default)]
    pub llm: LlmSettings,

    /// Analysis settings
    #[serde(default)]
    pub analysis: AnalyzerConfig,
}

/// OneBot HTTP API connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneBotSettings {
    /// Base URL of the OneBot HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the API requires one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Per-action timeout in seconds
    #[serde(default = "default_onebot_timeout")]
    pub timeout_secs: u64,
}

/// OpenAI-compatible LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Full chat-completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; `--api-key` or `CHATDIGEST_API_KEY` take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Timeout and retry behaviour of every completion call
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".chatdigest").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Serialize configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.onebot.base_url.trim().is_empty() {
            return Err(CliError::Config("onebot.base_url must not be empty".into()));
        }
        if self.llm.endpoint.trim().is_empty() {
            return Err(CliError::Config("llm.endpoint must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        self.llm
            .retry
            .validate()
            .map_err(|e| CliError::Config(format!("llm.retry: {}", e)))?;
        self.analysis
            .validate()
            .map_err(|e| CliError::Config(format!("analysis: {}", e)))?;
        Ok(())
    }
}

impl Default for OneBotSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            timeout_secs: default_onebot_timeout(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            retry: RetryPolicy::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_onebot_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.onebot.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.llm.retry.max_attempts, 3);
        assert_eq!(config.analysis.min_messages_threshold, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [onebot]
            base_url = "http://10.0.0.2:5700"
            access_token = "secret"

            [llm]
            model = "deepseek-chat"

            [llm.retry]
            max_attempts = 5

            [analysis]
            min_messages_threshold = 10
            enabled_groups = ["123"]

            [analysis.extractor]
            max_topics = 3
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.onebot.base_url, "http://10.0.0.2:5700");
        assert_eq!(config.onebot.access_token.as_deref(), Some("secret"));
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.endpoint, default_endpoint());
        assert_eq!(config.llm.retry.max_attempts, 5);
        assert_eq!(config.llm.retry.backoff_ms, 2_000);
        assert_eq!(config.analysis.min_messages_threshold, 10);
        assert_eq!(config.analysis.extractor.max_topics, 3);
        assert_eq!(config.analysis.fetcher.max_query_rounds, 35);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        config.analysis.topic_analysis_enabled = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis.fetcher]\nmax_messages = 0\n").unwrap();

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("max_messages")));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[onebot\nbase_url = ").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(CliError::Toml(_))));
    }
}
