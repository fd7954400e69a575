//! Chunked summarization of long documents.
//!
//! Splits a document into token-bounded chunks, requests one partial
//! summary per chunk from the configured LLM provider, and combines the
//! partials — re-entering the pipeline when the combination is itself
//! still too long for one chunk.

pub mod chunker;
pub mod pipeline;
pub mod prompt;
pub mod token;

pub use chunker::{split, Chunk, ChunkError};
pub use pipeline::{SummarizeError, SummarizeOptions, Summarizer};
pub use token::estimate_tokens;
