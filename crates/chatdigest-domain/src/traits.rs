//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{FetchCursor, RawMessage};
use async_trait::async_trait;

/// One page as answered by the message source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    /// A well-formed page; empty means there is no more history
    Messages(Vec<RawMessage>),

    /// The source answered, but without the expected structure
    Malformed(String),
}

/// Trait for reading paginated chat history
///
/// Implemented by the infrastructure layer (chatdigest-fetcher)
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Error type for transport failures
    type Error: std::fmt::Display + Send;

    /// Fetch up to `count` messages older than `cursor`, newest page first
    async fn get_page(
        &self,
        group_id: &str,
        cursor: FetchCursor,
        count: usize,
    ) -> Result<PageResponse, Self::Error>;

    /// The bot's own user id, if it can be determined
    async fn resolve_self_id(&self) -> Option<String>;
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Prompt text
    pub prompt: String,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional model override understood by the provider
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Create a request with the given budget and temperature
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
            model: None,
        }
    }
}

/// Usage counters as reported by a provider; any of them may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportedUsage {
    /// Prompt tokens, if reported
    pub prompt_tokens: Option<u64>,

    /// Completion tokens, if reported
    pub completion_tokens: Option<u64>,

    /// Total tokens, if reported
    pub total_tokens: Option<u64>,
}

/// A provider's answer to a completion request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    /// Completion body
    pub text: String,

    /// Usage block, absent when the provider does not report one
    pub usage: Option<ReportedUsage>,
}

impl CompletionResponse {
    /// Completion body
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Usage with missing counters defaulted to zero
    pub fn token_usage(&self) -> crate::TokenUsage {
        let usage = self.usage.unwrap_or_default();
        crate::TokenUsage::new(
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        )
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (chatdigest-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenUsage;

    #[test]
    fn test_missing_usage_defaults_to_zero() {
        let response = CompletionResponse {
            text: "[]".to_string(),
            usage: None,
        };
        assert_eq!(response.token_usage(), TokenUsage::zero());

        let response = CompletionResponse {
            text: "[]".to_string(),
            usage: Some(ReportedUsage {
                prompt_tokens: Some(12),
                completion_tokens: None,
                total_tokens: Some(20),
            }),
        };
        assert_eq!(response.token_usage(), TokenUsage::new(12, 0, 20));
    }
}
