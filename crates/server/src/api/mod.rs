//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared types and the provider guard live here in mod.rs.

mod chat;
mod health;
mod summarize;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use condense_llm::LlmProvider;

use crate::state::AppState;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

// ── Provider guard ───────────────────────────────────────────────

/// Return 503 when no LLM provider is configured.
pub(crate) fn require_provider(state: &AppState) -> Result<Arc<dyn LlmProvider>, ApiError> {
    state.provider.clone().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM provider not configured. Set LLM_PROVIDER and API keys.",
        )
    })
}

// ── Re-exports ───────────────────────────────────────────────────
// Preserves flat `api::foo` import paths used by main.rs route registration.

pub use chat::chat;
pub use health::{config_summary, health, personas};
pub use summarize::{summarize_text, summarize_upload, summarize_url};
