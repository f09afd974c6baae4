//! Chatdigest LLM Provider Layer
//!
//! Pluggable LLM provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `chatdigest-domain`.
//! It supports multiple LLM backends with a common interface.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: Any OpenAI-compatible chat-completions endpoint
//! - `RetryingProvider`: Wraps another provider with timeout, bounded retries and backoff
//!
//! # Examples
//!
//! ```
//! use chatdigest_llm::MockProvider;
//! use chatdigest_domain::traits::{CompletionRequest, LlmProvider};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let response = provider.complete(&CompletionRequest::new("test prompt", 100, 0.5)).await.unwrap();
//! assert_eq!(response.text, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod retry;

use async_trait::async_trait;
use chatdigest_domain::traits::{
    CompletionRequest, CompletionResponse, LlmProvider as LlmProviderTrait, ReportedUsage,
};
use chatdigest_domain::TokenUsage;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiProvider;
pub use retry::{RetryPolicy, RetryingProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// A single attempt ran past its deadline
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Every attempt failed
    #[error("All {attempts} attempts failed, last error: {last}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Message of the final failure
        last: String,
    },

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A canned reply served by [`MockProvider`]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful completion
    Text {
        /// Completion body
        text: String,
        /// Usage to report
        usage: Option<TokenUsage>,
    },
    /// Failed call
    Error,
}

impl MockReply {
    /// Successful completion without usage
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text {
            text: text.into(),
            usage: None,
        }
    }

    /// Successful completion reporting `usage`
    pub fn with_usage(text: impl Into<String>, usage: TokenUsage) -> Self {
        MockReply::Text {
            text: text.into(),
            usage: Some(usage),
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Replies are looked up in order: queued replies, exact prompt matches,
/// substring rules, then the default reply.
///
/// # Examples
///
/// ```
/// use chatdigest_llm::{MockProvider, MockReply};
/// use chatdigest_domain::traits::{CompletionRequest, LlmProvider};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let mut provider = MockProvider::new("fallback");
/// provider.respond_when_contains("topics", MockReply::text("[]"));
///
/// let request = CompletionRequest::new("extract topics please", 100, 0.6);
/// assert_eq!(provider.complete(&request).await.unwrap().text, "[]");
///
/// let request = CompletionRequest::new("anything else", 100, 0.6);
/// assert_eq!(provider.complete(&request).await.unwrap().text, "fallback");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_reply(MockReply::text(response))
    }

    /// Create a new MockProvider whose default is the given reply
    pub fn with_reply(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            responses: Arc::new(Mutex::new(HashMap::new())),
            rules: Arc::new(Mutex::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider that fails every call
    pub fn failing() -> Self {
        Self::with_reply(MockReply::Error)
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), MockReply::text(response));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), MockReply::Error);
    }

    /// Reply with `reply` to any prompt containing `needle`
    pub fn respond_when_contains(&mut self, needle: impl Into<String>, reply: MockReply) {
        self.rules.lock().unwrap().push((needle.into(), reply));
    }

    /// Serve `reply` to the next call, ahead of every other rule
    pub fn enqueue(&self, reply: MockReply) {
        self.queue.lock().unwrap().push_back(reply);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn pick_reply(&self, prompt: &str) -> MockReply {
        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return reply;
        }
        if let Some(reply) = self.responses.lock().unwrap().get(prompt) {
            return reply.clone();
        }
        let rules = self.rules.lock().unwrap();
        rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Self::Error> {
        // Increment call count
        *self.call_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(request.clone());

        match self.pick_reply(&request.prompt) {
            MockReply::Text { text, usage } => Ok(CompletionResponse {
                text,
                usage: usage.map(|u| ReportedUsage {
                    prompt_tokens: Some(u.prompt_tokens),
                    completion_tokens: Some(u.completion_tokens),
                    total_tokens: Some(u.total_tokens),
                }),
            }),
            MockReply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}
