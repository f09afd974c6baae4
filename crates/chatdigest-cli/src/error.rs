//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message source construction error
    #[error("Message source error: {0}")]
    Fetch(#[from] chatdigest_fetcher::FetchError),

    /// LLM provider construction error
    #[error("LLM error: {0}")]
    Llm(#[from] chatdigest_llm::LlmError),

    /// Analysis error
    #[error("Analysis failed: {0}")]
    Analyzer(#[from] chatdigest_analyzer::AnalyzerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
