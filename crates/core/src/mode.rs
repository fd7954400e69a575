//! Summarization mode selection.

use serde::{Deserialize, Serialize};

/// The requested shape of a summary, chosen per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SummaryMode {
    /// Concise prose capturing main points and key details.
    Prose,
    /// Key points as a bullet list.
    Bullets,
    /// Extract/answer a specific question from the document.
    Question { question: String },
}

impl SummaryMode {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SummaryMode::Prose => "prose",
            SummaryMode::Bullets => "bullets",
            SummaryMode::Question { .. } => "question",
        }
    }
}
