use super::ExtractionError;

pub(crate) fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    Ok(normalize_pdf_text(&text))
}

/// Rejoin words hyphenated across line breaks and trim the result.
/// PDF extraction keeps layout line breaks that mean nothing to a reader.
fn normalize_pdf_text(text: &str) -> String {
    text.replace("-\n", "").trim().to_string()
}
