//! Summarization endpoints: pasted text, fetched URL, uploaded file.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use condense_core::SummaryMode;
use condense_extract::{extract_text, fetch_and_extract, ExtractionError};
use condense_llm::LlmError;
use condense_summarize::{SummarizeError, SummarizeOptions, Summarizer};

use crate::state::AppState;

use super::{error_response, require_provider, ApiError};

// ── Request/response types ───────────────────────────────────────

#[derive(Deserialize)]
pub struct SummarizeTextRequest {
    pub text: String,
    #[serde(flatten)]
    pub mode: SummaryMode,
    pub max_tokens_per_chunk: Option<usize>,
    pub temperature: Option<f32>,
}

#[derive(Deserialize)]
pub struct SummarizeUrlRequest {
    pub url: String,
    #[serde(flatten)]
    pub mode: SummaryMode,
    pub max_tokens_per_chunk: Option<usize>,
    pub temperature: Option<f32>,
}

#[derive(Serialize, Debug)]
pub struct SummarizeResponse {
    pub summary: String,
    /// Word count of the source document, reported back to the UI.
    pub source_words: usize,
}

// ── Handlers ─────────────────────────────────────────────────────

pub async fn summarize_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeTextRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    run_summarize(
        &state,
        req.text,
        req.mode,
        req.max_tokens_per_chunk,
        req.temperature,
    )
    .await
}

pub async fn summarize_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeUrlRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let doc = fetch_and_extract(&state.http, &req.url)
        .await
        .map_err(extraction_error_response)?;
    require_extracted_text(&doc)?;
    info!(source = %doc.source, words = doc.word_count(), "page ready for summarization");

    run_summarize(
        &state,
        doc.text,
        req.mode,
        req.max_tokens_per_chunk,
        req.temperature,
    )
    .await
}

pub async fn summarize_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut mode_name: Option<String> = None;
    let mut question: Option<String> = None;
    let mut max_tokens_per_chunk: Option<usize> = None;
    let mut temperature: Option<f32> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("Multipart error: {e}"))
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    error_response(StatusCode::BAD_REQUEST, format!("Failed to read file: {e}"))
                })?;
                file = Some((filename, bytes.to_vec()));
            }
            "mode" => mode_name = Some(read_text_field(field).await?),
            "question" => question = Some(read_text_field(field).await?),
            "max_tokens_per_chunk" => {
                max_tokens_per_chunk = Some(parse_field(field, "max_tokens_per_chunk").await?)
            }
            "temperature" => temperature = Some(parse_field(field, "temperature").await?),
            other => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown field '{other}'"),
                ))
            }
        }
    }

    let (filename, bytes) = file.ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "No file provided")
    })?;
    let mode = parse_mode(mode_name.as_deref().unwrap_or("prose"), question)?;

    let doc = extract_text(&bytes, &filename).map_err(extraction_error_response)?;
    require_extracted_text(&doc)?;
    info!(source = %doc.source, words = doc.word_count(), "upload ready for summarization");

    run_summarize(&state, doc.text, mode, max_tokens_per_chunk, temperature).await
}

// ── Shared plumbing ──────────────────────────────────────────────

async fn run_summarize(
    state: &AppState,
    text: String,
    mode: SummaryMode,
    max_tokens_per_chunk: Option<usize>,
    temperature: Option<f32>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let provider = require_provider(state)?;

    let mut options = SummarizeOptions::from_config(&state.config);
    if let Some(budget) = max_tokens_per_chunk {
        options.max_tokens_per_chunk = budget;
    }
    if let Some(t) = temperature {
        options.temperature = t;
    }

    let source_words = text.split_whitespace().count();
    let summarizer = Summarizer::new(provider, options);
    let summary = summarizer
        .summarize(&text, &mode)
        .await
        .map_err(summarize_error_response)?;

    Ok(Json(SummarizeResponse { summary, source_words }))
}

/// Reject documents that extracted to nothing (e.g. scanned/image PDFs
/// with no text layer) with a message the user can act on.
fn require_extracted_text(doc: &condense_extract::ExtractedDocument) -> Result<(), ApiError> {
    if doc.text.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "'{}' contains no extractable text. For PDFs, ensure the file has a text layer \
                 (scanned/image PDFs are not supported).",
                doc.source
            ),
        ));
    }
    Ok(())
}

/// Build a `SummaryMode` from the upload form's flat fields.
fn parse_mode(name: &str, question: Option<String>) -> Result<SummaryMode, ApiError> {
    match name {
        "prose" => Ok(SummaryMode::Prose),
        "bullets" => Ok(SummaryMode::Bullets),
        "question" => {
            let question = question.filter(|q| !q.trim().is_empty()).ok_or_else(|| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    "mode 'question' requires a non-empty 'question' field",
                )
            })?;
            Ok(SummaryMode::Question { question })
        }
        other => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown mode '{other}' (expected prose, bullets, or question)"),
        )),
    }
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("Multipart error: {e}"))
    })
}

async fn parse_field<T: std::str::FromStr>(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<T, ApiError> {
    let raw = read_text_field(field).await?;
    raw.trim().parse().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid value for '{name}': {raw}"),
        )
    })
}

fn extraction_error_response(error: ExtractionError) -> ApiError {
    let status = match &error {
        ExtractionError::HttpStatus { .. } | ExtractionError::Fetch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, error.to_string())
}

fn summarize_error_response(error: SummarizeError) -> ApiError {
    let status = match &error {
        SummarizeError::InvalidConfig(_) | SummarizeError::Chunk(_) => StatusCode::BAD_REQUEST,
        SummarizeError::Llm { source, .. } => match source {
            LlmError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        },
        SummarizeError::NonConvergent { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error.to_string())
}
