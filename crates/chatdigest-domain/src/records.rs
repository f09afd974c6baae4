//! Records extracted from the chat corpus by the LLM

use serde::{Deserialize, Serialize};

/// A discussion topic with the people who drove it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic name
    pub topic: String,

    /// Main participants (never empty)
    pub contributors: Vec<String>,

    /// What was discussed and concluded
    pub detail: String,
}

/// A playful title assigned to an active member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTitle {
    /// Display name
    pub name: String,

    /// Numeric platform id
    pub qq: i64,

    /// Assigned title
    pub title: String,

    /// Four-letter personality type code, upper-case
    pub mbti: String,

    /// Why the title fits
    pub reason: String,
}

/// A memorable line from the chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenQuote {
    /// The quote, verbatim
    pub content: String,

    /// Who said it
    pub sender: String,

    /// Why it was picked
    pub reason: String,
}
