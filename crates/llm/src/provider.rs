use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat message for the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Trait for LLM providers — each backend implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and return the assistant's response text.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Provider name for logging (e.g., "openai", "anthropic", "ollama").
    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} — {body}")]
    Api { status: u16, body: String },
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("authentication failed")]
    Auth,
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Whether a retry with backoff has a chance of succeeding.
    ///
    /// Network failures, rate limits, and server-side errors are transient;
    /// bad credentials, malformed requests, and unparseable responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Auth | LlmError::Parse(_) | LlmError::NotConfigured(_) => false,
        }
    }
}

/// Mock LLM provider for exercising callers without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// What the mock should do for one `complete` call.
    pub struct MockReply {
        pub delay: Duration,
        pub result: Result<String, LlmError>,
    }

    impl MockReply {
        pub fn text(text: impl Into<String>) -> Self {
            Self { delay: Duration::ZERO, result: Ok(text.into()) }
        }

        pub fn error(err: LlmError) -> Self {
            Self { delay: Duration::ZERO, result: Err(err) }
        }

        pub fn after(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    /// A provider whose behavior is a function of the request messages,
    /// so concurrent callers get deterministic replies.
    pub struct MockProvider {
        handler: Box<dyn Fn(&[Message]) -> MockReply + Send + Sync>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn new(handler: impl Fn(&[Message]) -> MockReply + Send + Sync + 'static) -> Self {
            Self { handler: Box::new(handler), calls: AtomicUsize::new(0) }
        }

        /// A mock that answers every request with the same text.
        pub fn always(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_| MockReply::text(text.clone()))
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = (self.handler)(&messages);
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
