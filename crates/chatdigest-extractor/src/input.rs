//! Input preparation for each artifact
//!
//! Turns raw messages into the compact lines and member summaries the
//! prompts are built from. Everything here is pure.

use chatdigest_domain::{RawMessage, UserActivity};
use chatdigest_stats::LocalClock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Members with fewer messages are not considered for titles
pub const MIN_MESSAGES_FOR_TITLE: u64 = 5;

/// Hours (local, exclusive end) that count as night
const NIGHT_HOURS: std::ops::Range<usize> = 0..6;

/// One chat line as shown to the LLM
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    /// Local `HH:MM`
    pub time: String,
    /// Display name of the sender
    pub sender: String,
    /// Cleaned text
    pub content: String,
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.time, self.sender, self.content)
    }
}

/// Activity profile of one member, as shown to the LLM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    /// Display name
    pub name: String,
    /// Numeric platform id
    pub qq: i64,
    /// Messages sent
    pub message_count: u64,
    /// Average characters per message, one decimal
    pub avg_chars: f64,
    /// Basic emoji per message, two decimals
    pub emoji_ratio: f64,
    /// Share of messages sent between 00:00 and 06:00, two decimals
    pub night_ratio: f64,
    /// Replies per message, two decimals
    pub reply_ratio: f64,
}

/// Text lines worth summarising into topics
///
/// Keeps trimmed text longer than two characters that is not a bot command,
/// with smart quotes normalised and control characters removed.
pub fn topic_lines(messages: &[RawMessage], clock: LocalClock) -> Vec<ChatLine> {
    let mut lines = Vec::new();
    for message in messages {
        for text in message.texts() {
            let text = text.trim();
            if text.chars().count() <= 2 || text.starts_with('/') {
                continue;
            }
            let content = clean_text(text);
            if content.is_empty() {
                continue;
            }
            lines.push(ChatLine {
                time: clock.hh_mm(message.timestamp),
                sender: message.sender.display_name().to_string(),
                content,
            });
        }
    }
    lines
}

/// Short, self-contained lines that could be quoted
///
/// Keeps trimmed text of 5 to 100 characters that is not a link or command.
pub fn quote_lines(messages: &[RawMessage], clock: LocalClock) -> Vec<ChatLine> {
    let mut lines = Vec::new();
    for message in messages {
        for text in message.texts() {
            let text = text.trim();
            let len = text.chars().count();
            if !(5..=100).contains(&len) || ["http", "www", "/"].iter().any(|p| text.starts_with(p)) {
                continue;
            }
            lines.push(ChatLine {
                time: clock.hh_mm(message.timestamp),
                sender: message.sender.display_name().to_string(),
                content: text.to_string(),
            });
        }
    }
    lines
}

/// Profiles of the `max` most active members with enough messages
///
/// Members whose id is not numeric cannot receive a title and are skipped.
pub fn user_summaries(activity: &BTreeMap<String, UserActivity>, max: usize) -> Vec<UserSummary> {
    let mut summaries: Vec<UserSummary> = activity
        .iter()
        .filter(|(_, stats)| stats.message_count >= MIN_MESSAGES_FOR_TITLE)
        .filter_map(|(user_id, stats)| {
            let qq = user_id.parse::<i64>().ok()?;
            let count = stats.message_count as f64;
            let night: u64 = stats.hours[NIGHT_HOURS].iter().sum();
            Some(UserSummary {
                name: stats.nickname.clone(),
                qq,
                message_count: stats.message_count,
                avg_chars: round_to(stats.char_count as f64 / count, 1),
                emoji_ratio: round_to(stats.emoji_count as f64 / count, 2),
                night_ratio: round_to(night as f64 / count, 2),
                reply_ratio: round_to(stats.reply_count as f64 / count, 2),
            })
        })
        .collect();

    // Stable: ties keep id order
    summaries.sort_by(|a, b| b.message_count.cmp(&a.message_count));
    summaries.truncate(max);
    summaries
}

fn clean_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '“' | '”' => Some('"'),
            '‘' | '’' => Some('\''),
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
