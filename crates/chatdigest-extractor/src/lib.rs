//! Chatdigest Extractor
//!
//! Turns a chat corpus into validated records with an LLM: discussion
//! topics, member titles and golden quotes.
//!
//! # Overview
//!
//! Every extraction follows the same flow, parameterised by an [`Artifact`]:
//!
//! ```text
//! messages → input lines → prompt → LLM → parse chain → validated records
//! ```
//!
//! LLM output is parsed by an ordered chain (strict JSON, repaired JSON,
//! regex patterns) that stops at the first strategy yielding elements.
//! Elements missing a required field are dropped one by one.
//!
//! # Key Features
//!
//! - **Degrade, don't raise**: every failure ends in an empty, well-typed outcome
//! - **JSON repair**: fences, smart quotes, trailing commas, truncation and more
//! - **Usage accounting**: provider-reported token usage travels with the records
//!
//! # Example Usage
//!
//! ```
//! use chatdigest_domain::{ContentSegment, RawMessage, Sender};
//! use chatdigest_extractor::{Extractor, ExtractorConfig};
//! use chatdigest_llm::MockProvider;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let llm = MockProvider::new(
//!     r#"[{"topic": "Release", "contributors": ["alice"], "detail": "v2 ships Friday"}]"#,
//! );
//! let extractor = Extractor::new(llm, ExtractorConfig::default()).unwrap();
//!
//! let messages = vec![RawMessage::new(
//!     1,
//!     Sender::new("10001", "alice"),
//!     1_700_000_000,
//!     vec![ContentSegment::text("v2 ships on Friday")],
//! )];
//!
//! let outcome = extractor.extract_topics(&messages).await;
//! assert_eq!(outcome.records[0].topic, "Release");
//! # });
//! ```

#![warn(missing_docs)]

mod artifact;
mod config;
mod error;
mod extractor;
mod fallback;
mod input;
mod parser;
mod prompt;
mod repair;


pub use artifact::{Artifact, GoldenQuoteArtifact, TopicArtifact, UserTitleArtifact, MAX_CONTRIBUTORS};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{ExtractionOutcome, Extractor};
pub use input::{quote_lines, topic_lines, user_summaries, ChatLine, UserSummary, MIN_MESSAGES_FOR_TITLE};
pub use parser::{parse_direct, parse_repaired, run_parse_chain, ParseFailure, ParseOutcome, ParseStrategy};
pub use repair::{repair_json, strip_code_fences};
