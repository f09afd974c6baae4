//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint that accepts the OpenAI chat-completions request
//! shape (hosted APIs, vLLM, LM Studio, Ollama's `/v1` facade, ...).
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Bearer-token authentication
//! - Per-request timeout
//! - Usage counters surfaced as reported, missing ones left unset
//!
//! One call is one attempt; wrap the provider in
//! [`RetryingProvider`](crate::RetryingProvider) for retries and backoff.
//!
//! # Examples
//!
//! ```no_run
//! use chatdigest_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new(
//!     "https://api.openai.com/v1/chat/completions",
//!     "gpt-4o-mini",
//! )
//! .unwrap()
//! .with_api_key("sk-...");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use chatdigest_domain::traits::{
    CompletionRequest, CompletionResponse, LlmProvider as LlmProviderTrait, ReportedUsage,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for a single HTTP request (100 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// OpenAI-compatible chat-completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat-completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBlock>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsageBlock {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Full chat-completions URL
    /// - `model`: Model name sent with every request
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new provider with a custom per-request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            client,
        })
    }

    /// Authenticate with a bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Model used when the request does not override it
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Issue one chat-completions call
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable
    /// - The endpoint answers with a non-success status
    /// - The body is not a chat-completions response with message content
    pub async fn chat(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "POST {} model={} prompt_len={} max_tokens={}",
            self.endpoint,
            model,
            request.prompt.len(),
            request.max_tokens
        );

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(model.to_string()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("LLM endpoint returned HTTP {}", status);
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read body: {}", e)))?;

        parse_chat_response(&raw)
    }
}

/// Turn a chat-completions body into a completion response
fn parse_chat_response(raw: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(raw)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))?;

    let usage = parsed.usage.map(|u| ReportedUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(CompletionResponse { text, usage })
}

#[async_trait]
impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Self::Error> {
        self.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdigest_domain::TokenUsage;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("http://localhost:8000/v1/chat/completions", "qwen").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:8000/v1/chat/completions");
        assert_eq!(provider.model(), "qwen");
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_openai_provider_with_api_key() {
        let provider = OpenAiProvider::new("http://localhost:8000", "qwen")
            .unwrap()
            .with_api_key("secret");
        assert_eq!(provider.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_chat_response_with_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "[]"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
        }"#;
        let response = parse_chat_response(raw).unwrap();
        assert_eq!(response.text, "[]");
        assert_eq!(response.token_usage(), TokenUsage::new(120, 30, 150));
    }

    #[test]
    fn test_parse_chat_response_partial_usage() {
        let raw = r#"{"choices": [{"message": {"content": "ok"}}], "usage": {"total_tokens": 9}}"#;
        let response = parse_chat_response(raw).unwrap();
        assert_eq!(response.token_usage(), TokenUsage::new(0, 0, 9));
    }

    #[test]
    fn test_parse_chat_response_without_content() {
        let raw = r#"{"choices": []}"#;
        assert!(matches!(
            parse_chat_response(raw),
            Err(LlmError::InvalidResponse(_))
        ));

        assert!(matches!(
            parse_chat_response("<html>bad gateway</html>"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        // Use invalid endpoint to trigger error
        let provider = OpenAiProvider::new("http://localhost:99999/v1/chat/completions", "qwen").unwrap();

        let result = provider.chat(&CompletionRequest::new("test", 10, 0.5)).await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            _ => panic!("Expected Communication error"),
        }
    }
}
