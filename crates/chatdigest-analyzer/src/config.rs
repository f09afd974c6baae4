//! Configuration for a group analysis run

use chatdigest_extractor::ExtractorConfig;
use chatdigest_fetcher::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Day counts a caller may request
pub const ANALYSIS_DAYS_RANGE: RangeInclusive<u32> = 1..=7;

/// Configuration for the GroupAnalyzer
///
/// # Examples
///
/// ```
/// use chatdigest_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::from_toml(
///     r#"
///     min_messages_threshold = 20
///
///     [extractor]
///     max_topics = 3
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.min_messages_threshold, 20);
/// assert_eq!(config.extractor.max_topics, 3);
/// assert_eq!(config.fetcher.max_query_rounds, 35);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Corpora with fewer messages are not analysed
    #[serde(default = "default_min_messages_threshold")]
    pub min_messages_threshold: usize,

    /// Days analysed when the caller gives none, or an out-of-range value
    #[serde(default = "default_analysis_days")]
    pub analysis_days: u32,

    /// Groups allowed to be analysed; empty allows every group
    #[serde(default)]
    pub enabled_groups: Vec<String>,

    /// Run the topic extraction
    #[serde(default = "default_true")]
    pub topic_analysis_enabled: bool,

    /// Run the user title extraction
    #[serde(default = "default_true")]
    pub user_title_analysis_enabled: bool,

    /// History fetch settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_min_messages_threshold() -> usize {
    50
}

fn default_analysis_days() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_messages_threshold: default_min_messages_threshold(),
            analysis_days: default_analysis_days(),
            enabled_groups: Vec::new(),
            topic_analysis_enabled: true,
            user_title_analysis_enabled: true,
            fetcher: FetcherConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Whether `group_id` may be analysed
    pub fn is_group_enabled(&self, group_id: &str) -> bool {
        self.enabled_groups.is_empty() || self.enabled_groups.iter().any(|g| g == group_id)
    }

    /// The requested day count if it is in range, otherwise `analysis_days`
    pub fn resolve_days(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|days| ANALYSIS_DAYS_RANGE.contains(days))
            .unwrap_or(self.analysis_days)
    }

    /// Validate the configuration, nested sections included
    pub fn validate(&self) -> Result<(), String> {
        if !ANALYSIS_DAYS_RANGE.contains(&self.analysis_days) {
            return Err(format!(
                "analysis_days must be between {} and {}",
                ANALYSIS_DAYS_RANGE.start(),
                ANALYSIS_DAYS_RANGE.end()
            ));
        }
        self.fetcher.validate().map_err(|e| format!("fetcher: {}", e))?;
        self.extractor.validate().map_err(|e| format!("extractor: {}", e))?;
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
