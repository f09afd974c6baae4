//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur around an extraction
///
/// None of these escape [`Extractor::run_extraction`](crate::Extractor::run_extraction):
/// a failed extraction degrades to an empty outcome.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

