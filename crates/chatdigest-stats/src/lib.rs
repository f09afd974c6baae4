//! Chatdigest Stats
//!
//! Deterministic statistics over a fetched message list: message and
//! character counts, participants, the hour-of-day histogram, emoji usage by
//! category and per-member activity.
//!
//! Everything here is a single pass over borrowed messages with no hidden
//! state, so computing twice over the same input gives the same result.
//!
//! # Examples
//!
//! ```
//! use chatdigest_domain::{ContentSegment, RawMessage, Sender};
//! use chatdigest_stats::StatsAggregator;
//!
//! let messages = vec![RawMessage::new(
//!     1,
//!     Sender::new("10001", "alice"),
//!     9 * 3600,
//!     vec![ContentSegment::text("hello")],
//! )];
//!
//! let aggregator = StatsAggregator::with_offset_minutes(Some(0));
//! let stats = aggregator.compute_statistics(&messages);
//! assert_eq!(stats.message_count, 1);
//! assert_eq!(stats.total_characters, 5);
//! assert_eq!(stats.most_active_period, "09:00-10:00");
//! ```

#![warn(missing_docs)]

pub mod aggregator;
pub mod clock;
pub mod emoji;

pub use aggregator::{most_active_period, StatsAggregator};
pub use clock::LocalClock;
pub use emoji::classify_segment;
