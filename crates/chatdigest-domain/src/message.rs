//! Message module - raw chat history as fetched from the message source

use serde::{Deserialize, Serialize};

/// Who sent a message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sender {
    /// Platform user identifier
    pub user_id: String,

    /// Account nickname (may be empty)
    pub nickname: String,

    /// Group-specific display card (may be empty)
    pub card: String,
}

impl Sender {
    /// Create a sender with a user id and nickname
    pub fn new(user_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
            card: String::new(),
        }
    }

    /// Name used when quoting the sender: nickname, falling back to the group card
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdigest_domain::Sender;
    ///
    /// let mut sender = Sender::new("10001", "");
    /// sender.card = "Alice (ops)".to_string();
    /// assert_eq!(sender.display_name(), "Alice (ops)");
    /// ```
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.card
        } else {
            &self.nickname
        }
    }
}

/// Kind of a non-sticker media unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Voice recording
    Record,
    /// Video clip
    Video,
}

/// One typed unit of message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    /// Plain text
    Text {
        /// The text itself
        text: String,
    },

    /// Basic built-in emoji
    Face {
        /// Emoji identifier
        id: String,
    },

    /// Animated "market" sticker
    MarketFace {
        /// Sticker identifier
        emoji_id: String,
    },

    /// Super emoji
    BigFace {
        /// Sticker package identifier
        id: String,
    },

    /// Small emoji
    SmallFace {
        /// Emoji identifier
        id: String,
    },

    /// Image, possibly a sticker re-sent as a picture
    Image {
        /// File name or hash
        file: String,
        /// Descriptive caption supplied by the client
        summary: String,
    },

    /// Reply reference to an earlier message
    Reply {
        /// Referenced message identifier
        id: String,
    },

    /// Voice or video attachment
    Media {
        /// Record or video
        kind: MediaKind,
        /// Flattened textual form of the attachment's metadata
        descriptor: String,
    },

    /// Any content kind this crate does not interpret
    Other {
        /// Declared content kind
        kind: String,
    },
}

impl ContentSegment {
    /// Convenience constructor for a text segment
    pub fn text(text: impl Into<String>) -> Self {
        ContentSegment::Text { text: text.into() }
    }

    /// Text body, if this is a text segment
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentSegment::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A chat message as returned by the message source
///
/// Immutable once fetched; downstream consumers only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Message identifier, used as the pagination cursor
    pub message_id: i64,

    /// Sender of the message
    pub sender: Sender,

    /// Send time in Unix seconds
    pub timestamp: i64,

    /// Ordered content units
    pub segments: Vec<ContentSegment>,
}

impl RawMessage {
    /// Create a message
    pub fn new(message_id: i64, sender: Sender, timestamp: i64, segments: Vec<ContentSegment>) -> Self {
        Self {
            message_id,
            sender,
            timestamp,
            segments,
        }
    }

    /// Iterate over the text bodies of this message
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(ContentSegment::as_text)
    }
}
