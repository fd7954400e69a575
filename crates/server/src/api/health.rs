//! Health, config, and persona-listing endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.config.llm.provider.clone(),
        provider_configured: state.provider.is_some(),
    })
}

/// Redacted config view for the dashboard — never includes secrets.
pub async fn config_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config.redacted_summary())
}

/// Persona presets for the chat UI dropdown.
pub async fn personas(State(_state): State<Arc<AppState>>) -> Json<Vec<&'static str>> {
    Json(condense_core::PERSONA_PRESETS.to_vec())
}
