//! Corpus statistics and per-member activity

use crate::clock::LocalClock;
use crate::emoji::classify_segment;
use chatdigest_domain::{
    ContentSegment, EmojiStatistics, RawMessage, Statistics, TokenUsage, UserActivity, HOURS_PER_DAY,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Computes [`Statistics`] and [`UserActivity`] from fetched messages
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator {
    clock: LocalClock,
}

impl StatsAggregator {
    /// Aggregator bucketing hours with `clock`
    pub fn new(clock: LocalClock) -> Self {
        Self { clock }
    }

    /// Aggregator for an optional UTC offset in minutes (`None` is host local time)
    pub fn with_offset_minutes(minutes: Option<i32>) -> Self {
        Self::new(LocalClock::from_offset_minutes(minutes))
    }

    /// The clock used for hour buckets
    pub fn clock(&self) -> LocalClock {
        self.clock
    }

    /// Compute corpus statistics in one pass
    ///
    /// `golden_quotes` is left empty and `token_usage` zero; both are filled
    /// in when the report is assembled.
    pub fn compute_statistics(&self, messages: &[RawMessage]) -> Statistics {
        let mut participants: HashSet<&str> = HashSet::new();
        let mut hourly_activity = [0u64; HOURS_PER_DAY];
        let mut total_characters = 0u64;
        let mut emoji_statistics = EmojiStatistics::default();

        for message in messages {
            participants.insert(message.sender.user_id.as_str());
            hourly_activity[self.clock.hour(message.timestamp)] += 1;

            for segment in &message.segments {
                if let Some(text) = segment.as_text() {
                    total_characters += text.chars().count() as u64;
                } else {
                    classify_segment(segment, &mut emoji_statistics);
                }
            }
        }

        let statistics = Statistics {
            message_count: messages.len() as u64,
            total_characters,
            participant_count: participants.len() as u64,
            most_active_period: most_active_period(&hourly_activity),
            hourly_activity,
            emoji_count: emoji_statistics.total(),
            emoji_statistics,
            golden_quotes: Vec::new(),
            token_usage: TokenUsage::zero(),
        };

        info!(
            "Computed statistics: {} messages, {} participants, {} emoji, busiest {}",
            statistics.message_count,
            statistics.participant_count,
            statistics.emoji_count,
            statistics.most_active_period
        );

        statistics
    }

    /// Per-member activity keyed by sender id
    pub fn analyze_users(&self, messages: &[RawMessage]) -> BTreeMap<String, UserActivity> {
        let mut users: BTreeMap<String, UserActivity> = BTreeMap::new();

        for message in messages {
            let activity = users.entry(message.sender.user_id.clone()).or_default();
            activity.message_count += 1;
            activity.nickname = message.sender.display_name().to_string();
            activity.hours[self.clock.hour(message.timestamp)] += 1;

            for segment in &message.segments {
                match segment {
                    ContentSegment::Text { text } => activity.char_count += text.chars().count() as u64,
                    ContentSegment::Face { .. } => activity.emoji_count += 1,
                    ContentSegment::Reply { .. } => activity.reply_count += 1,
                    _ => {}
                }
            }
        }

        debug!("Analyzed activity of {} members", users.len());
        users
    }
}

/// Busiest hour as `"HH:00-HH:00"`; the earliest hour wins ties
///
/// # Examples
///
/// ```
/// use chatdigest_stats::most_active_period;
///
/// let mut hours = [0u64; 24];
/// hours[23] = 4;
/// assert_eq!(most_active_period(&hours), "23:00-00:00");
/// assert_eq!(most_active_period(&[0; 24]), "00:00-01:00");
/// ```
pub fn most_active_period(hourly_activity: &[u64; HOURS_PER_DAY]) -> String {
    let mut busiest = 0;
    for (hour, &count) in hourly_activity.iter().enumerate() {
        if count > hourly_activity[busiest] {
            busiest = hour;
        }
    }
    format!("{:02}:00-{:02}:00", busiest, (busiest + 1) % HOURS_PER_DAY)
}
