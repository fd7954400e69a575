//! Persona chat endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use condense_core::persona;
use condense_llm::{ChatClient, LlmError, Message};

use crate::state::AppState;

use super::{error_response, require_provider, ApiError};

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Preset persona description; defaults to the first preset.
    #[serde(default)]
    pub persona: Option<String>,
    /// Free-form persona override; wins over `persona` when non-empty.
    #[serde(default)]
    pub custom_role: Option<String>,
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
}

#[derive(Serialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let provider = require_provider(&state)?;

    if req.messages.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "messages must not be empty",
        ));
    }

    let preset = req
        .persona
        .as_deref()
        .unwrap_or(persona::PERSONA_PRESETS[0]);
    let system_prompt = persona::system_prompt(preset, req.custom_role.as_deref());

    let client = ChatClient::new(
        provider,
        state.config.llm.temperature,
        state.config.llm.max_tokens,
    );

    let reply = client
        .reply(&system_prompt, req.messages)
        .await
        .map_err(chat_error_response)?;

    Ok(Json(ChatResponse { reply }))
}

fn chat_error_response(error: LlmError) -> ApiError {
    let status = match &error {
        LlmError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use condense_core::Config;
    use condense_llm::provider::mock::{MockProvider, MockReply};
    use condense_llm::Role;

    fn state_with(provider: Option<Arc<MockProvider>>) -> Arc<AppState> {
        Arc::new(AppState {
            config: Config::for_profile("TEST_ONLY_UNSET"),
            http: reqwest::Client::new(),
            provider: provider.map(|p| p as Arc<dyn condense_llm::LlmProvider>),
        })
    }

    #[tokio::test]
    async fn chat_applies_the_persona_system_prompt() {
        let provider = Arc::new(MockProvider::new(|messages| {
            assert_eq!(messages[0].role, Role::System);
            assert!(messages[0].content.starts_with("You are text proofreader."));
            MockReply::text("Corrected text.")
        }));
        let state = state_with(Some(provider));

        let response = chat(
            State(state),
            Json(ChatRequest {
                persona: Some("text proofreader".into()),
                custom_role: None,
                messages: vec![Message::user("fix thsi")],
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.reply, "Corrected text.");
    }

    #[tokio::test]
    async fn chat_without_provider_is_503() {
        let state = state_with(None);
        let err = chat(
            State(state),
            Json(ChatRequest {
                persona: None,
                custom_role: None,
                messages: vec![Message::user("hi")],
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected() {
        let provider = Arc::new(MockProvider::always("unused"));
        let state = state_with(Some(provider));
        let err = chat(
            State(state),
            Json(ChatRequest {
                persona: None,
                custom_role: None,
                messages: vec![],
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
