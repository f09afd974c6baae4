//! Statistics and the assembled analysis result

use crate::records::{GoldenQuote, TopicSummary, UserTitle};
use crate::usage::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hours in a day, the size of every hour histogram
pub const HOURS_PER_DAY: usize = 24;

/// Emoji and sticker counts by category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmojiStatistics {
    /// Basic built-in emoji
    pub face_count: u64,

    /// Animated stickers, including stickers re-sent as images
    pub mface_count: u64,

    /// Super emoji
    pub bface_count: u64,

    /// Small emoji
    pub sface_count: u64,

    /// Emoji carried by voice or video attachments
    pub other_emoji_count: u64,

    /// Occurrences per `{kind}_{id}` key, for diagnostics
    pub face_details: BTreeMap<String, u64>,
}

impl EmojiStatistics {
    /// Sum of all five category counters
    pub fn total(&self) -> u64 {
        self.face_count + self.mface_count + self.bface_count + self.sface_count + self.other_emoji_count
    }

    /// Bump the diagnostic counter for `key`
    pub fn record_detail(&mut self, key: String) {
        *self.face_details.entry(key).or_insert(0) += 1;
    }
}

/// Deterministic corpus statistics, later enriched with golden quotes and usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of messages analysed
    pub message_count: u64,

    /// Characters across all text segments
    pub total_characters: u64,

    /// Distinct senders
    pub participant_count: u64,

    /// Busiest hour as `"HH:00-HH:00"`
    pub most_active_period: String,

    /// Messages per local hour of day
    pub hourly_activity: [u64; HOURS_PER_DAY],

    /// Total emoji, kept alongside the breakdown for flat consumers
    pub emoji_count: u64,

    /// Emoji breakdown by category
    pub emoji_statistics: EmojiStatistics,

    /// Quotes picked by the LLM
    pub golden_quotes: Vec<GoldenQuote>,

    /// Tokens spent producing this result
    pub token_usage: TokenUsage,
}

/// Per-member activity counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserActivity {
    /// Last seen display name
    pub nickname: String,

    /// Messages sent
    pub message_count: u64,

    /// Characters across text segments
    pub char_count: u64,

    /// Basic emoji sent
    pub emoji_count: u64,

    /// Reply segments sent
    pub reply_count: u64,

    /// Messages per local hour of day
    pub hours: [u64; HOURS_PER_DAY],
}

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Corpus statistics with golden quotes and summed token usage
    pub statistics: Statistics,

    /// Extracted topics
    pub topics: Vec<TopicSummary>,

    /// Extracted user titles
    pub user_titles: Vec<UserTitle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_total() {
        let stats = EmojiStatistics {
            face_count: 1,
            mface_count: 2,
            bface_count: 3,
            sface_count: 4,
            other_emoji_count: 5,
            face_details: BTreeMap::new(),
        };
        assert_eq!(stats.total(), 15);
    }

    #[test]
    fn test_record_detail_accumulates() {
        let mut stats = EmojiStatistics::default();
        stats.record_detail("face_178".to_string());
        stats.record_detail("face_178".to_string());
        assert_eq!(stats.face_details.get("face_178"), Some(&2));
    }
}
