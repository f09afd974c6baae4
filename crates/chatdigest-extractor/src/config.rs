//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Largest accepted UTC offset, exclusive (24 hours in minutes)
const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum topics kept per run
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    /// Maximum members given a title per run
    #[serde(default = "default_max_user_titles")]
    pub max_user_titles: usize,

    /// Maximum golden quotes kept per run
    #[serde(default = "default_max_golden_quotes")]
    pub max_golden_quotes: usize,

    /// Offset of local time from UTC in minutes; host local time when unset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Model override sent with every completion request
    #[serde(default)]
    pub model: Option<String>,
}

fn default_max_topics() -> usize {
    5
}

fn default_max_user_titles() -> usize {
    8
}

fn default_max_golden_quotes() -> usize {
    5
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_topics: default_max_topics(),
            max_user_titles: default_max_user_titles(),
            max_golden_quotes: default_max_golden_quotes(),
            utc_offset_minutes: None,
            model: None,
        }
    }
}

impl ExtractorConfig {
    /// Brief preset: fewer records of each kind
    pub fn brief() -> Self {
        Self {
            max_topics: 3,
            max_user_titles: 5,
            max_golden_quotes: 3,
            ..Self::default()
        }
    }

    /// Detailed preset: more records of each kind
    pub fn detailed() -> Self {
        Self {
            max_topics: 10,
            max_user_titles: 12,
            max_golden_quotes: 10,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_topics == 0 {
            return Err("max_topics must be greater than 0".to_string());
        }
        if self.max_user_titles == 0 {
            return Err("max_user_titles must be greater than 0".to_string());
        }
        if self.max_golden_quotes == 0 {
            return Err("max_golden_quotes must be greater than 0".to_string());
        }
        if let Some(offset) = self.utc_offset_minutes {
            if offset.abs() >= MAX_OFFSET_MINUTES {
                return Err(format!("utc_offset_minutes out of range: {}", offset));
            }
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
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_topics, 5);
        assert_eq!(config.max_user_titles, 8);
        assert_eq!(config.max_golden_quotes, 5);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::brief().validate().is_ok());
        assert!(ExtractorConfig::detailed().validate().is_ok());
    }

    #[test]
    fn test_invalid_counts() {
        let mut config = ExtractorConfig::default();
        config.max_topics = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.max_golden_quotes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_offset() {
        let mut config = ExtractorConfig::default();
        config.utc_offset_minutes = Some(480);
        assert!(config.validate().is_ok());

        config.utc_offset_minutes = Some(-1440);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ExtractorConfig::detailed();
        config.utc_offset_minutes = Some(480);
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }
}
