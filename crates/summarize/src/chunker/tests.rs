//! Tests for the chunker.

use super::{split, split_sentences};
use crate::token::estimate_tokens;

/// Collapse all whitespace so texts can be compared modulo split points.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn paragraph(word: &str, count: usize) -> String {
    (0..count).map(|i| format!("{word}{i}")).collect::<Vec<_>>().join(" ")
}

// ── Budget and boundaries ───────────────────────────────────────────

#[test]
fn all_paragraphs_fit_one_chunk_under_a_large_budget() {
    let text = format!(
        "{}\n\n{}\n\n{}",
        paragraph("a", 40),
        paragraph("b", 40),
        paragraph("c", 40)
    );
    let chunks = split(&text, 150).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].tokens, 120);
}

#[test]
fn tight_budget_yields_one_chunk_per_paragraph() {
    let text = format!(
        "{}\n\n{}\n\n{}",
        paragraph("a", 40),
        paragraph("b", 40),
        paragraph("c", 40)
    );
    let chunks = split(&text, 50).unwrap();
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].text.starts_with("a0"));
    assert!(chunks[2].text.starts_with("c0"));
}

#[test]
fn chunks_respect_the_budget() {
    let text = (0..12)
        .map(|i| paragraph(&format!("p{i}w"), 30))
        .collect::<Vec<_>>()
        .join("\n\n");
    let budget = 100;
    for chunk in split(&text, budget).unwrap() {
        assert!(
            chunk.tokens <= budget,
            "chunk {} has {} tokens over budget {budget}",
            chunk.index,
            chunk.tokens
        );
        assert_eq!(chunk.tokens, estimate_tokens(&chunk.text));
    }
}

#[test]
fn oversized_paragraph_splits_at_sentence_boundaries() {
    let sentences: Vec<String> = (0..10)
        .map(|i| format!("Sentence number {i} contains exactly six words."))
        .collect();
    let text = sentences.join(" ");
    let chunks = split(&text, 20).unwrap();
    assert!(chunks.len() >= 3);
    for chunk in &chunks {
        assert!(chunk.tokens <= 20);
        // No sentence is cut: every chunk ends at terminal punctuation.
        assert!(chunk.text.trim_end().ends_with('.'));
    }
}

#[test]
fn single_sentence_over_budget_is_emitted_whole() {
    let long_sentence = format!("{} end", paragraph("w", 50));
    let chunks = split(&long_sentence, 10).unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].tokens > 10, "violation must stay visible");
    assert_eq!(normalize(&chunks[0].text), normalize(&long_sentence));
}

#[test]
fn oversized_sentence_does_not_absorb_neighbours() {
    let text = format!(
        "Short opener here. {} tail. Short closer here.",
        paragraph("X", 30)
    );
    let chunks = split(&text, 10).unwrap();
    // The giant middle sentence stands alone; its neighbours do not.
    let oversized: Vec<_> = chunks.iter().filter(|c| c.tokens > 10).collect();
    assert_eq!(oversized.len(), 1);
    assert!(oversized[0].text.contains("X0"));
    assert!(!oversized[0].text.contains("opener"));
    assert!(!oversized[0].text.contains("closer"));
}

// ── Reconstruction ──────────────────────────────────────────────────

#[test]
fn joined_chunks_reconstruct_the_document() {
    let text = "First paragraph with some words.\n\nSecond one here. It has two sentences.\n\nThird paragraph closes the document.";
    for budget in [1, 3, 5, 8, 100] {
        let chunks = split(text, budget).unwrap();
        let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&joined), normalize(text), "budget {budget}");
    }
}

// ── Edge cases ──────────────────────────────────────────────────────

#[test]
fn empty_input_produces_no_chunks() {
    assert!(split("", 100).unwrap().is_empty());
}

#[test]
fn whitespace_only_input_produces_no_chunks() {
    assert!(split("   \n\n\t\n   ", 100).unwrap().is_empty());
}

#[test]
fn non_empty_input_produces_at_least_one_chunk() {
    let chunks = split("Just one paragraph.", 500).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, "Just one paragraph.");
}

#[test]
fn zero_budget_is_rejected() {
    let err = split("anything", 0).unwrap_err();
    assert!(matches!(err, super::ChunkError::InvalidBudget(0)));
}

#[test]
fn chunk_indices_are_sequential() {
    let text = "A one.\n\nB two.\n\nC three.\n\nD four.";
    let chunks = split(text, 2).unwrap();
    assert!(chunks.len() > 1);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.index, i);
    }
}

#[test]
fn budget_of_one_still_loses_nothing() {
    let text = "Alpha beta. Gamma delta.";
    let chunks = split(text, 1).unwrap();
    let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(normalize(&joined), normalize(text));
}

// ── Sentence splitting ──────────────────────────────────────────────

#[test]
fn sentence_splitting() {
    let text = "First sentence. Second sentence. Third one.";
    let sents = split_sentences(text);
    assert_eq!(sents.len(), 3);
    assert!(sents[0].starts_with("First"));
    assert!(sents[1].starts_with("Second"));
}

#[test]
fn abbreviations_do_not_end_sentences() {
    // Lowercase after the period means no boundary.
    let text = "The v. interesting case. Another sentence.";
    let sents = split_sentences(text);
    assert_eq!(sents.len(), 2);
}

#[test]
fn question_and_exclamation_terminate_sentences() {
    let text = "Really? Yes! Quite sure.";
    let sents = split_sentences(text);
    assert_eq!(sents.len(), 3);
}
