use std::sync::Arc;

use condense_core::Config;
use condense_llm::LlmProvider;

pub struct AppState {
    pub config: Config,
    /// Shared client for outbound page fetches.
    pub http: reqwest::Client,
    /// None when no provider credentials are configured — the endpoints
    /// that need one answer 503 instead of failing at startup.
    pub provider: Option<Arc<dyn LlmProvider>>,
}
