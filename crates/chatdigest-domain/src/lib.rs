//! Chatdigest Domain Layer
//!
//! This crate contains the data model shared by every other crate and the
//! trait interfaces through which the core talks to its collaborators.
//!
//! ## Key Concepts
//!
//! - **RawMessage**: A fetched chat message, immutable once fetched
//! - **FetchWindow**: The `[now - days, now]` span a fetch must cover
//! - **FetchCursor**: Oldest message id of the last page, used to paginate
//! - **TokenUsage**: Provider-reported token counters, summed across calls
//! - **Records**: Topic summaries, user titles and golden quotes
//! - **AnalysisResult**: Statistics plus the extracted records
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure implementations live in other crates
//! - `serde` derives so results can leave the process; `async-trait` for
//!   the collaborator seams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod message;
pub mod records;
pub mod statistics;
pub mod traits;
pub mod usage;
pub mod window;

// Re-exports for convenience
pub use message::{ContentSegment, MediaKind, RawMessage, Sender};
pub use records::{GoldenQuote, TopicSummary, UserTitle};
pub use statistics::{AnalysisResult, EmojiStatistics, Statistics, UserActivity, HOURS_PER_DAY};
pub use usage::TokenUsage;
pub use window::{FetchCursor, FetchWindow, SECONDS_PER_DAY};
