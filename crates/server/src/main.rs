mod api;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    condense_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = condense_core::Config::from_env();
    config.log_summary();

    let provider: Option<Arc<dyn condense_llm::LlmProvider>> =
        match condense_llm::create_provider(&config.llm, &config.ollama) {
            Ok(p) => {
                info!("LLM provider ready: {}", p.name());
                Some(Arc::from(p))
            }
            Err(e) => {
                warn!(
                    "LLM provider not available: {} — chat and summarization will answer 503",
                    e
                );
                None
            }
        };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;

    let state = Arc::new(state::AppState {
        config,
        http: reqwest::Client::new(),
        provider,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/config", get(api::config_summary))
        .route("/personas", get(api::personas))
        .route("/chat", post(api::chat))
        .route("/summarize/text", post(api::summarize_text))
        .route("/summarize/url", post(api::summarize_url))
        .route("/summarize/upload", post(api::summarize_upload))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
