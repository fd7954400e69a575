//! Fetching documents (web pages or PDFs) from a URL.

use bytes::Bytes;
use tracing::info;

use crate::{html, pdf, DocumentKind, ExtractedDocument, ExtractionError};

/// Some sites refuse requests without a browser User-Agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/77.0.3835.0 Safari/537.36";

/// A fetched response body with its declared content type.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub url: String,
    /// Lowercased Content-Type header value.
    pub content_type: String,
    pub body: Bytes,
}

/// GET a URL and return its body and content type.
pub async fn fetch_url(
    client: &reqwest::Client,
    url: &str,
) -> Result<FetchedContent, ExtractionError> {
    let parsed = url::Url::parse(url).map_err(|e| ExtractionError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractionError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    info!("Fetching content from URL: {url}");

    let response = client
        .get(parsed)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "*/*")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    let body = response.bytes().await?;

    info!("Received {} bytes of {content_type}", body.len());

    Ok(FetchedContent {
        url: url.to_string(),
        content_type,
        body,
    })
}

/// Fetch a URL and extract its text, dispatching on the content type.
pub async fn fetch_and_extract(
    client: &reqwest::Client,
    url: &str,
) -> Result<ExtractedDocument, ExtractionError> {
    let fetched = fetch_url(client, url).await?;
    extract_fetched(fetched)
}

fn extract_fetched(fetched: FetchedContent) -> Result<ExtractedDocument, ExtractionError> {
    let (kind, text) = if fetched.content_type.contains("application/pdf") {
        (DocumentKind::Pdf, pdf::extract_pdf(&fetched.body)?)
    } else if fetched.content_type.contains("text/html") {
        (
            DocumentKind::Html,
            html::extract_html(&String::from_utf8_lossy(&fetched.body)),
        )
    } else if fetched.content_type.contains("text/plain") {
        (
            DocumentKind::Text,
            String::from_utf8_lossy(&fetched.body).into_owned(),
        )
    } else {
        return Err(ExtractionError::UnsupportedContentType(
            fetched.content_type,
        ));
    };

    tracing::info!(
        source = %fetched.url,
        words = text.split_whitespace().count(),
        "extracted page"
    );

    Ok(ExtractedDocument {
        source: fetched.url,
        kind,
        text,
    })
}
