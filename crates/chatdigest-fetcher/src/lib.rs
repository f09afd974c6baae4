//! Chatdigest Fetcher
//!
//! Collects the chat history of a time window from a paginated message source.
//!
//! # Overview
//!
//! The [`PageFetcher`] walks history backwards, newest page first, and stops
//! on whichever comes first:
//!
//! - the window start has been crossed
//! - `max_messages` have been collected
//! - `max_query_rounds` page requests have been issued
//! - the source has no more history, or a page yields nothing in the window
//! - too many consecutive pages failed
//!
//! Failures never escape: a fetch always returns the messages it collected.
//!
//! [`OneBotSource`] is the bundled HTTP implementation of
//! [`MessageSource`](chatdigest_domain::traits::MessageSource).

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fetcher;
pub mod onebot;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use fetcher::{FetchOutcome, PageFetcher, StopReason};
pub use onebot::OneBotSource;
