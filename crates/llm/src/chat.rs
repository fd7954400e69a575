//! Persona chat orchestration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::provider::{LlmError, LlmProvider, Message, Role};

/// Drives a persona conversation against an LLM provider.
pub struct ChatClient {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(
        llm_config: &condense_core::config::LlmConfig,
        ollama_config: &condense_core::config::OllamaConfig,
    ) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(llm_config, ollama_config)?;
        Ok(Self::new(
            Arc::from(provider),
            llm_config.temperature,
            llm_config.max_tokens,
        ))
    }

    /// Send the conversation and return the assistant's reply.
    ///
    /// `system_prompt` is prepended as the single system message; any system
    /// messages in the caller's history are dropped so the persona cannot be
    /// overridden mid-conversation.
    pub async fn reply(
        &self,
        system_prompt: &str,
        history: Vec<Message>,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(history.into_iter().filter(|m| m.role != Role::System));

        info!(
            provider = self.provider.name(),
            turns = messages.len() - 1,
            "chat completion"
        );

        let response = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;

        debug!("chat reply: {} chars", response.len());
        Ok(response)
    }
}
