//! Summarization orchestration: chunk, fan out, combine, reduce.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use condense_core::{Config, SummaryMode};
use condense_llm::{LlmError, LlmProvider, Message};

use crate::chunker::{self, Chunk, ChunkError};
use crate::prompt;
use crate::token::estimate_tokens;

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("completion failed on chunk {chunk_index}: {source}")]
    Llm {
        chunk_index: usize,
        #[source]
        source: LlmError,
    },
    #[error("summary stopped shrinking after {passes} passes ({tokens} tokens); aborting")]
    NonConvergent { passes: usize, tokens: usize },
}

/// Per-request knobs for the pipeline, captured from config at call time.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Token budget per chunk (and for the final combined summary).
    pub max_tokens_per_chunk: usize,
    pub temperature: f32,
    /// Target summary length as a percentage of each chunk.
    pub length_percent: u32,
    /// Max simultaneous in-flight completion calls.
    pub max_concurrency: usize,
    /// Retries per chunk for transient provider errors.
    pub max_retries: u32,
    /// max_tokens passed to the provider for each partial summary.
    pub reply_max_tokens: u32,
}

impl SummarizeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tokens_per_chunk: config.summarize.max_tokens_per_chunk,
            temperature: config.llm.temperature,
            length_percent: config.summarize.length_percent,
            max_concurrency: config.summarize.max_concurrency,
            max_retries: config.summarize.max_retries,
            reply_max_tokens: config.llm.max_tokens,
        }
    }
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 7000,
            temperature: 0.8,
            length_percent: 20,
            max_concurrency: 4,
            max_retries: 3,
            reply_max_tokens: 4096,
        }
    }
}

/// Runs the chunked summarization pipeline against an LLM provider.
///
/// Each `summarize` call owns its chunk list and partial summaries
/// exclusively; dropping the returned future abandons in-flight and
/// not-yet-issued completion calls without leaving partial state behind.
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    options: SummarizeOptions,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, options: SummarizeOptions) -> Self {
        Self { provider, options }
    }

    /// Summarize `document` in the requested mode.
    ///
    /// Empty input returns an empty summary without calling the provider.
    /// Any completion failure aborts the whole operation — a summary with
    /// missing sections is worse than none.
    pub async fn summarize(
        &self,
        document: &str,
        mode: &SummaryMode,
    ) -> Result<String, SummarizeError> {
        self.validate()?;

        let mut text = document.to_string();
        let mut passes = 0usize;

        loop {
            passes += 1;
            let chunks = chunker::split(&text, self.options.max_tokens_per_chunk)?;
            if chunks.is_empty() {
                return Ok(String::new());
            }

            let input_tokens = estimate_tokens(&text);
            info!(
                pass = passes,
                chunks = chunks.len(),
                tokens = input_tokens,
                mode = mode.label(),
                "summarizing"
            );

            let partials = self.summarize_chunks(&chunks, mode).await?;
            let combined = combine(partials, mode);

            if matches!(mode, SummaryMode::Question { .. })
                && combined == prompt::NO_ANSWER_RESULT
            {
                return Ok(combined);
            }

            let combined_tokens = estimate_tokens(&combined);
            if combined_tokens <= self.options.max_tokens_per_chunk {
                return Ok(combined);
            }
            if combined_tokens >= input_tokens {
                // Partials are not actually shorter than their sources;
                // another pass would loop forever.
                return Err(SummarizeError::NonConvergent {
                    passes,
                    tokens: combined_tokens,
                });
            }

            debug!(
                pass = passes,
                tokens = combined_tokens,
                "combined summary still over budget; re-entering pipeline"
            );
            text = combined;
        }
    }

    fn validate(&self) -> Result<(), SummarizeError> {
        let t = self.options.temperature;
        if !(0.0..=2.0).contains(&t) {
            return Err(SummarizeError::InvalidConfig(format!(
                "temperature {t} outside [0, 2]"
            )));
        }
        if self.options.max_concurrency < 1 {
            return Err(SummarizeError::InvalidConfig(
                "max_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// One completion per chunk, at most `max_concurrency` in flight.
    ///
    /// `try_join_all` yields results in chunk order regardless of
    /// completion order, and aborts everything on the first hard failure.
    async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        mode: &SummaryMode,
    ) -> Result<Vec<String>, SummarizeError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency));
        let total = chunks.len();

        let tasks = chunks.iter().map(|chunk| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                self.summarize_chunk(chunk, total, mode).await
            }
        });

        try_join_all(tasks).await
    }

    /// Summarize a single chunk, retrying transient provider failures
    /// with capped exponential backoff.
    async fn summarize_chunk(
        &self,
        chunk: &Chunk,
        total: usize,
        mode: &SummaryMode,
    ) -> Result<String, SummarizeError> {
        let instruction = prompt::chunk_instruction(
            mode,
            &chunk.text,
            chunk.index + 1,
            total,
            self.options.length_percent,
        );
        let messages = vec![
            Message::system(prompt::SUMMARY_SYSTEM_PROMPT),
            Message::user(instruction),
        ];

        let mut attempt = 0u32;
        loop {
            match self
                .provider
                .complete(
                    messages.clone(),
                    self.options.temperature,
                    self.options.reply_max_tokens,
                )
                .await
            {
                Ok(partial) => {
                    debug!(chunk = chunk.index, chars = partial.len(), "partial summary ready");
                    return Ok(partial);
                }
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(&e, attempt);
                    warn!(
                        chunk = chunk.index,
                        attempt,
                        error = %e,
                        "transient completion failure; retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(SummarizeError::Llm {
                        chunk_index: chunk.index,
                        source: e,
                    })
                }
            }
        }
    }
}

/// Honor the server's requested pause for rate limits; otherwise back off
/// exponentially, capped at 10s.
fn retry_delay(error: &LlmError, attempt: u32) -> Duration {
    if let LlmError::RateLimited { retry_after_secs } = error {
        return Duration::from_secs(*retry_after_secs);
    }
    let backoff = Duration::from_millis(500) * 2u32.pow(attempt.min(5));
    backoff.min(Duration::from_secs(10))
}

/// Join partial summaries in chunk order with blank lines.
///
/// Question mode drops not-found partials first; if nothing answered the
/// question, the result is the explicit no-answer sentence, never "".
fn combine(partials: Vec<String>, mode: &SummaryMode) -> String {
    let kept: Vec<String> = match mode {
        SummaryMode::Question { .. } => {
            let kept: Vec<String> = partials
                .into_iter()
                .filter(|p| !prompt::is_not_found(p))
                .collect();
            if kept.is_empty() {
                return prompt::NO_ANSWER_RESULT.to_string();
            }
            kept
        }
        _ => partials,
    };

    kept.iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use condense_llm::provider::mock::{MockProvider, MockReply};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn options(budget: usize) -> SummarizeOptions {
        SummarizeOptions {
            max_tokens_per_chunk: budget,
            temperature: 0.8,
            length_percent: 20,
            max_concurrency: 4,
            max_retries: 3,
            reply_max_tokens: 512,
        }
    }

    fn summarizer_with(
        provider: Arc<MockProvider>,
        opts: SummarizeOptions,
    ) -> Summarizer {
        Summarizer::new(provider, opts)
    }

    /// Three distinct paragraphs that chunk 1:1 under a budget of 8.
    const THREE_PART_DOC: &str = "alpha one two three four five six seven\n\n\
                                  bravo one two three four five six seven\n\n\
                                  charlie one two three four five six seven";

    #[tokio::test]
    async fn empty_document_short_circuits() {
        let provider = Arc::new(MockProvider::always("should never be called"));
        let summarizer = summarizer_with(provider.clone(), options(100));

        let summary = summarizer.summarize("", &SummaryMode::Prose).await.unwrap();
        assert_eq!(summary, "");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn whitespace_document_short_circuits() {
        let provider = Arc::new(MockProvider::always("no"));
        let summarizer = summarizer_with(provider.clone(), options(100));

        let summary = summarizer
            .summarize(" \n\n \t ", &SummaryMode::Bullets)
            .await
            .unwrap();
        assert_eq!(summary, "");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn single_chunk_returns_its_partial() {
        let provider = Arc::new(MockProvider::always("a tidy summary"));
        let summarizer = summarizer_with(provider.clone(), options(100));

        let summary = summarizer
            .summarize("One short paragraph to summarize.", &SummaryMode::Prose)
            .await
            .unwrap();
        assert_eq!(summary, "a tidy summary");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn combination_preserves_chunk_order_under_concurrency() {
        // Later chunks answer sooner; the combined output must still
        // follow document order.
        let provider = Arc::new(MockProvider::new(|messages| {
            let body = &messages[1].content;
            if body.contains("alpha") {
                MockReply::text("P0").after(Duration::from_millis(30))
            } else if body.contains("bravo") {
                MockReply::text("P1").after(Duration::from_millis(20))
            } else {
                MockReply::text("P2").after(Duration::from_millis(10))
            }
        }));
        let summarizer = summarizer_with(provider.clone(), options(8));

        let summary = summarizer
            .summarize(THREE_PART_DOC, &SummaryMode::Prose)
            .await
            .unwrap();
        assert_eq!(summary, "P0\n\nP1\n\nP2");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn fatal_error_on_one_chunk_fails_the_whole_operation() {
        let provider = Arc::new(MockProvider::new(|messages| {
            if messages[1].content.contains("bravo") {
                MockReply::error(LlmError::Auth)
            } else {
                MockReply::text("fine")
            }
        }));
        let summarizer = summarizer_with(provider, options(8));

        let err = summarizer
            .summarize(THREE_PART_DOC, &SummaryMode::Prose)
            .await
            .unwrap_err();
        match err {
            SummarizeError::Llm { chunk_index, source } => {
                assert_eq!(chunk_index, 1);
                assert!(matches!(source, LlmError::Auth));
            }
            other => panic!("expected Llm error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let failures = AtomicU32::new(0);
        let provider = Arc::new(MockProvider::new(move |_| {
            if failures.fetch_add(1, Ordering::SeqCst) == 0 {
                MockReply::error(LlmError::Api { status: 503, body: "overloaded".into() })
            } else {
                MockReply::text("recovered")
            }
        }));
        let summarizer = summarizer_with(provider.clone(), options(100));

        let summary = summarizer
            .summarize("A paragraph.", &SummaryMode::Prose)
            .await
            .unwrap();
        assert_eq!(summary, "recovered");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_pause_is_honored() {
        let failures = AtomicU32::new(0);
        let provider = Arc::new(MockProvider::new(move |_| {
            if failures.fetch_add(1, Ordering::SeqCst) == 0 {
                MockReply::error(LlmError::RateLimited { retry_after_secs: 7 })
            } else {
                MockReply::text("after the pause")
            }
        }));
        let summarizer = summarizer_with(provider, options(100));

        let started = tokio::time::Instant::now();
        let summary = summarizer
            .summarize("A paragraph.", &SummaryMode::Prose)
            .await
            .unwrap();
        assert_eq!(summary, "after the pause");
        assert!(started.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_exhaust_and_abort() {
        let provider = Arc::new(MockProvider::new(|_| {
            MockReply::error(LlmError::Api { status: 503, body: "still down".into() })
        }));
        let mut opts = options(100);
        opts.max_retries = 2;
        let summarizer = summarizer_with(provider.clone(), opts);

        let err = summarizer
            .summarize("A paragraph.", &SummaryMode::Prose)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SummarizeError::Llm { source: LlmError::Api { status: 503, .. }, .. }
        ));
        // Initial attempt plus two retries.
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn question_mode_filters_not_found_sections() {
        let mode = SummaryMode::Question { question: "What year?".into() };
        let provider = Arc::new(MockProvider::new(|messages| {
            if messages[1].content.contains("bravo") {
                MockReply::text("The year was 1987.")
            } else {
                MockReply::text(prompt::NOT_FOUND_SENTINEL)
            }
        }));
        let summarizer = summarizer_with(provider, options(8));

        let summary = summarizer.summarize(THREE_PART_DOC, &mode).await.unwrap();
        assert_eq!(summary, "The year was 1987.");
    }

    #[tokio::test]
    async fn question_mode_all_not_found_yields_explicit_answer() {
        let mode = SummaryMode::Question { question: "What year?".into() };
        let provider = Arc::new(MockProvider::always(prompt::NOT_FOUND_SENTINEL));
        let summarizer = summarizer_with(provider, options(8));

        let summary = summarizer.summarize(THREE_PART_DOC, &mode).await.unwrap();
        assert_eq!(summary, prompt::NO_ANSWER_RESULT);
        assert!(!summary.is_empty());
    }

    #[tokio::test]
    async fn oversized_combination_triggers_a_reduction_pass() {
        // Four 4-word paragraphs, budget 4: pass one produces four 2-word
        // partials (8 tokens combined, still over budget); pass two pairs
        // them into two chunks and converges.
        let doc = "one alpha beta gamma\n\ntwo alpha beta gamma\n\n\
                   three alpha beta gamma\n\nfour alpha beta gamma";
        let provider = Arc::new(MockProvider::always("condensed part"));
        let summarizer = summarizer_with(provider.clone(), options(4));

        let summary = summarizer.summarize(doc, &SummaryMode::Prose).await.unwrap();
        assert_eq!(summary, "condensed part\n\ncondensed part");
        assert_eq!(provider.call_count(), 6);
    }

    #[tokio::test]
    async fn non_shrinking_pass_fails_instead_of_looping() {
        // Partials as long as their sources: the pipeline must bail out.
        let doc = "one alpha beta gamma\n\ntwo alpha beta gamma";
        let provider = Arc::new(MockProvider::always("echo echo echo echo"));
        let summarizer = summarizer_with(provider.clone(), options(4));

        let err = summarizer.summarize(doc, &SummaryMode::Prose).await.unwrap_err();
        assert!(matches!(err, SummarizeError::NonConvergent { passes: 1, .. }));
    }

    #[tokio::test]
    async fn out_of_range_temperature_is_rejected_before_any_call() {
        let provider = Arc::new(MockProvider::always("no"));
        let mut opts = options(100);
        opts.temperature = 2.5;
        let summarizer = summarizer_with(provider.clone(), opts);

        let err = summarizer
            .summarize("Some text.", &SummaryMode::Prose)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidConfig(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn zero_budget_is_rejected_before_any_call() {
        let provider = Arc::new(MockProvider::always("no"));
        let summarizer = summarizer_with(provider.clone(), options(0));

        let err = summarizer
            .summarize("Some text.", &SummaryMode::Prose)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Chunk(ChunkError::InvalidBudget(0))));
        assert_eq!(provider.call_count(), 0);
    }
}
