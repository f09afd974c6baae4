//! Retry wrapper for any LLM provider
//!
//! Each attempt runs under a timeout; failed attempts are followed by a
//! linear backoff (`backoff * attempt`) before the next one.

use crate::LlmError;
use async_trait::async_trait;
use chatdigest_domain::traits::{CompletionRequest, CompletionResponse, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

/// How a [`RetryingProvider`] retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Base backoff in milliseconds; attempt `n` waits `n * backoff_ms`
    pub backoff_ms: u64,

    /// Deadline for a single attempt, in seconds
    pub timeout_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2_000,
            timeout_secs: 100,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
            timeout_secs: 100,
        }
    }

    /// Per-attempt deadline as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay after the given (1-based) failed attempt
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Provider wrapper adding timeouts and bounded retries
///
/// # Examples
///
/// ```
/// use chatdigest_llm::{MockProvider, RetryPolicy, RetryingProvider};
///
/// let provider = RetryingProvider::new(MockProvider::new("[]"), RetryPolicy::default());
/// assert_eq!(provider.policy().max_attempts, 3);
/// ```
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P> LlmProvider for RetryingProvider<P>
where
    P: LlmProvider,
{
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Self::Error> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.policy.timeout(), self.inner.complete(request)).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    warn!("LLM request failed (attempt {}/{}): {}", attempt, attempts, e);
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(
                        "LLM request timed out (attempt {}/{}, timeout {}s)",
                        attempt, attempts, self.policy.timeout_secs
                    );
                    last_error = LlmError::Timeout(self.policy.timeout_secs).to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.policy.backoff_after(attempt)).await;
            }
        }

        error!("LLM request failed after {} attempts: {}", attempts, last_error);
        Err(LlmError::RetriesExhausted {
            attempts,
            last: last_error,
        })
    }
}
