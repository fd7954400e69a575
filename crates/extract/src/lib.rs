//! Plain-text extraction from the document sources the app accepts:
//! uploaded PDF/text files and fetched web pages.

pub mod fetch;
mod html;
mod pdf;

pub use fetch::{fetch_and_extract, fetch_url, FetchedContent};
pub use html::extract_html;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },
}

/// Where a document's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Html,
    Text,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename or URL.
    pub source: String,
    pub kind: DocumentKind,
    /// Extracted plain text.
    pub text: String,
}

impl ExtractedDocument {
    /// Approximate word count, reported to the user after extraction.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Extract text from uploaded file bytes based on file type.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    let (kind, text) = match ext.as_str() {
        "pdf" => (DocumentKind::Pdf, pdf::extract_pdf(bytes)?),
        "txt" | "text" | "md" | "markdown" => (
            DocumentKind::Text,
            String::from_utf8_lossy(bytes).into_owned(),
        ),
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    tracing::info!(
        source = filename,
        words = text.split_whitespace().count(),
        "extracted document"
    );

    Ok(ExtractedDocument {
        source: filename.to_string(),
        kind,
        text,
    })
}
