//! Instruction building for per-chunk completion requests.

use condense_core::SummaryMode;

use crate::token::estimate_tokens;

/// System prompt for every summarization completion.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a summarization expert. Your summary should be \
     accurate and objective. Add headings and subheadings. Use markdown for formatting.";

/// The exact reply a model is told to give when a chunk holds no answer
/// to the focus question.
pub const NOT_FOUND_SENTINEL: &str = "Not found in this section.";

/// Final result when no chunk answered the focus question.
pub const NO_ANSWER_RESULT: &str = "No answer to the question was found in the document.";

/// Build the user instruction for one chunk.
///
/// `part` is 1-based; when the document fits a single chunk the "part N
/// of the larger text" framing is dropped. The word target scales with
/// the chunk's own length.
pub fn chunk_instruction(
    mode: &SummaryMode,
    chunk_text: &str,
    part: usize,
    total_parts: usize,
    length_percent: u32,
) -> String {
    let words = estimate_tokens(chunk_text);
    let target_words = ((words as u64 * length_percent as u64) / 100).max(1);

    match mode {
        SummaryMode::Prose => {
            if total_parts > 1 {
                format!(
                    "Please summarize with capturing main points and key details from the \
                     following {part}. part of the larger text in {target_words} words: {chunk_text}"
                )
            } else {
                format!(
                    "Please summarize with capturing main points and key details from the \
                     following text in {target_words} words: {chunk_text}"
                )
            }
        }
        SummaryMode::Bullets => {
            if total_parts > 1 {
                format!(
                    "Please summarize with capturing main points and key details in form of \
                     bullets from the following {part}. part of the larger text in {target_words} \
                     words: {chunk_text}"
                )
            } else {
                format!(
                    "Please summarize with capturing main points and key details in form of \
                     bullets from the following text in {target_words} words: {chunk_text}"
                )
            }
        }
        SummaryMode::Question { question } => {
            if total_parts > 1 {
                format!(
                    "Please analyze the {part}. part of the larger text and provide a summary in \
                     {target_words} words focusing on the question: `{question}`. If this part \
                     contains nothing relevant to the question, reply exactly \
                     `{NOT_FOUND_SENTINEL}`. This part of the text is: {chunk_text}"
                )
            } else {
                format!(
                    "Please analyze the following text and provide a summary in {target_words} \
                     words focusing on the question: `{question}`. If the text contains nothing \
                     relevant to the question, reply exactly `{NOT_FOUND_SENTINEL}`. The text \
                     is: {chunk_text}"
                )
            }
        }
    }
}

/// Whether a partial answer is the not-found sentinel (modulo trailing
/// punctuation and case — models take liberties).
pub fn is_not_found(partial: &str) -> bool {
    let normalized = partial.trim().trim_end_matches(['.', '!']).to_lowercase();
    normalized == "not found in this section"
}
