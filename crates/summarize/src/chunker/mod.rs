//! Budget-bounded document chunking.
//!
//! Splits text at paragraph boundaries, falling back to sentence
//! boundaries for paragraphs that exceed the budget on their own. Nothing
//! is ever dropped: a single sentence larger than the budget is emitted
//! as its own oversized chunk rather than truncated.

use crate::token::estimate_tokens;

#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk budget must be at least 1 token, got {0}")]
    InvalidBudget(usize),
}

/// A token-bounded contiguous piece of the input document.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 0-based position in the chunk sequence.
    pub index: usize,
    pub text: String,
    /// Estimated token count of `text`.
    pub tokens: usize,
}

/// Split `text` into ordered chunks of at most `max_tokens` estimated
/// tokens each.
///
/// Non-empty input yields at least one chunk; empty or whitespace-only
/// input yields none. Joining the chunk texts reconstructs the input up
/// to whitespace at the split points. The budget is exceeded only by a
/// chunk holding a single indivisible sentence, which is logged.
pub fn split(text: &str, max_tokens: usize) -> Result<Vec<Chunk>, ChunkError> {
    if max_tokens < 1 {
        return Err(ChunkError::InvalidBudget(max_tokens));
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buf = String::new();
    let mut buf_tokens = 0usize;

    for piece in units(text, max_tokens) {
        let piece_tokens = estimate_tokens(&piece);

        if piece_tokens > max_tokens {
            // A lone sentence over budget: flush and emit it intact.
            if !buf.is_empty() {
                push_chunk(&mut chunks, std::mem::take(&mut buf));
                buf_tokens = 0;
            }
            tracing::warn!(
                tokens = piece_tokens,
                budget = max_tokens,
                "indivisible sentence exceeds the chunk budget; emitting oversized chunk"
            );
            push_chunk(&mut chunks, piece);
            continue;
        }

        if !buf.is_empty() && buf_tokens + piece_tokens > max_tokens {
            push_chunk(&mut chunks, std::mem::take(&mut buf));
            buf_tokens = 0;
        }

        if buf.is_empty() {
            buf = piece;
        } else {
            buf.push_str("\n\n");
            buf.push_str(&piece);
        }
        buf_tokens += piece_tokens;
    }

    if !buf.is_empty() {
        push_chunk(&mut chunks, buf);
    }

    Ok(chunks)
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: String) {
    let index = chunks.len();
    let tokens = estimate_tokens(&text);
    chunks.push(Chunk { index, text, tokens });
}

/// Break `text` into pieces no larger than `max_tokens` where boundaries
/// allow: whole paragraphs, or sentence runs for oversized paragraphs.
/// A single sentence over the budget is returned whole.
fn units(text: &str, max_tokens: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if estimate_tokens(para) <= max_tokens {
            pieces.push(para.to_string());
            continue;
        }

        // Paragraph over budget: pack whole sentences up to the limit.
        let mut buf = String::new();
        for sent in split_sentences(para) {
            if buf.is_empty() {
                buf = sent;
            } else if estimate_tokens(&buf) + estimate_tokens(&sent) <= max_tokens {
                buf.push(' ');
                buf.push_str(&sent);
            } else {
                pieces.push(std::mem::take(&mut buf));
                buf = sent;
            }
        }
        if !buf.is_empty() {
            pieces.push(buf);
        }
    }

    pieces
}

/// Split `text` at sentence boundaries (`. `, `! `, `? ` followed by
/// uppercase or newline). Returns non-empty fragments.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        let is_terminal = bytes[i] == b'.' || bytes[i] == b'!' || bytes[i] == b'?';
        if is_terminal {
            // Look ahead: must be followed by a space then uppercase or newline.
            if i + 1 < bytes.len() && bytes[i + 1] == b' ' {
                let after_space = if i + 2 < bytes.len() {
                    bytes[i + 2]
                } else {
                    b'\n' // end-of-string acts like newline
                };
                if after_space.is_ascii_uppercase() || after_space == b'\n' {
                    let end = i + 1; // include the terminal punctuation
                    let s = text[start..end].trim();
                    if !s.is_empty() {
                        sentences.push(s.to_string());
                    }
                    start = end + 1; // skip the space
                    i = start;
                    continue;
                }
            }
        }
        i += 1;
    }

    // Remainder
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests;
