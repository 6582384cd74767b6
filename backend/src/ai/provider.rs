use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A chat message sent to a completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A text completion backend. Each vendor implements this.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short vendor name reported to clients (`gemini`, `openai`).
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Send a chat completion request and return the response text.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl AiError {
    /// Overload, rate limiting and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            AiError::Http(e) => e.is_timeout() || e.is_connect(),
            AiError::Parse(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Calls `provider`, retrying retryable failures with exponential backoff.
pub async fn complete_with_retry(
    provider: &dyn CompletionProvider,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    policy: RetryPolicy,
) -> Result<String, AiError> {
    let mut attempt = 0;
    loop {
        match provider
            .complete(messages.clone(), temperature, max_tokens)
            .await
        {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                warn!(
                    "{} request failed ({}), retrying in {:?} ({}/{})",
                    provider.name(),
                    e,
                    delay,
                    attempt + 1,
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
