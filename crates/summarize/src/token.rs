//! Local token estimation.

/// Approximate LLM token count via whitespace word splitting.
///
/// The hosted model's real tokenizer is not available locally; a word
/// count is a stable stand-in for budgeting chunks. The function is pure:
/// deterministic, zero for empty input, and never decreasing when text is
/// appended — the properties the chunker's greedy loop relies on.
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}
