//! Error types for group analysis

use chatdigest_extractor::ExtractorError;
use thiserror::Error;

/// Reasons an analysis run produces no report
///
/// Transport and LLM failures are not among them: those degrade to partial
/// or empty sections of the report.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The group is not in the allow list
    #[error("Group {0} is not enabled for analysis")]
    GroupNotEnabled(String),

    /// The fetch returned nothing
    #[error("No chat history found for group {0}")]
    NoMessages(String),

    /// Too few messages for a meaningful analysis
    #[error("Insufficient messages: found {count}, need at least {threshold}")]
    InsufficientMessages {
        /// Messages fetched
        count: usize,
        /// Configured minimum
        threshold: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extractor construction error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}
