//! Output formatting for the CLI.

use crate::error::Result;
use chatdigest_domain::AnalysisResult;
use colored::*;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Render an analysis result as JSON.
    pub fn format_result(&self, result: &AnalysisResult, compact: bool) -> Result<String> {
        if compact {
            Ok(serde_json::to_string(result)?)
        } else {
            Ok(serde_json::to_string_pretty(result)?)
        }
    }

    /// One-line summary of a result, for the status stream.
    pub fn summary(&self, result: &AnalysisResult) -> String {
        let stats = &result.statistics;
        self.success(&format!(
            "{} messages from {} members, busiest {}: {} topics, {} titles, {} quotes, {} tokens",
            stats.message_count,
            stats.participant_count,
            stats.most_active_period,
            result.topics.len(),
            result.user_titles.len(),
            stats.golden_quotes.len(),
            stats.token_usage.total_tokens
        ))
    }

    /// Format success message.
    pub fn success(&self, msg: &str) -> String {
        self.colorize(&format!("✓ {}", msg), "green")
    }

    /// Format info message.
    pub fn info(&self, msg: &str) -> String {
        self.colorize(&format!("ℹ {}", msg), "blue")
    }

    /// Format warning message.
    pub fn warning(&self, msg: &str) -> String {
        self.colorize(&format!("⚠ {}", msg), "yellow")
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdigest_domain::{EmojiStatistics, Statistics, TokenUsage, HOURS_PER_DAY};

    fn result() -> AnalysisResult {
        AnalysisResult {
            statistics: Statistics {
                message_count: 120,
                total_characters: 2400,
                participant_count: 9,
                most_active_period: "21:00-22:00".to_string(),
                hourly_activity: [5; HOURS_PER_DAY],
                emoji_count: 4,
                emoji_statistics: EmojiStatistics::default(),
                golden_quotes: Vec::new(),
                token_usage: TokenUsage::new(900, 100, 1000),
            },
            topics: Vec::new(),
            user_titles: Vec::new(),
        }
    }

    #[test]
    fn test_json_output() {
        let formatter = Formatter::new(false);

        let pretty = formatter.format_result(&result(), false).unwrap();
        assert!(pretty.contains("\n"));
        let parsed: AnalysisResult = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed, result());

        let compact = formatter.format_result(&result(), true).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"most_active_period\":\"21:00-22:00\""));
    }

    #[test]
    fn test_summary_without_color() {
        let formatter = Formatter::new(false);
        assert_eq!(
            formatter.summary(&result()),
            "✓ 120 messages from 9 members, busiest 21:00-22:00: 0 topics, 0 titles, 0 quotes, 1000 tokens"
        );
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
