/*!
 * Batch translation processing.
 *
 * The [`Orchestrator`] fans chunks out to the [`TranslationClient`] with
 * bounded concurrency, reports progress as chunks complete, and returns one
 * [`TranslationRecord`] per chunk in chunk order. A chunk that fails becomes a
 * flagged record; the batch itself always runs to the end.
 */

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::document::{Chunk, LanguagePair, TranslationRecord, WordParagraph};
use crate::errors::TranslationError;
use crate::language_utils::{has_phonetic_system, language_codes_match};
use crate::phonetic;

use super::core::TranslationClient;
use super::prompts;

/// Upper bound on concurrent chunk workers
pub const MAX_CONCURRENCY: usize = 16;

/// Which text the pinyin gloss is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneticSource {
    /// The source chunk, when the source language has a phonetic system
    Source,
    /// The translation, when the target language has one
    Target,
    /// Source first, otherwise target
    #[default]
    Auto,
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Number of chunks translated at once, clamped to 1..=16
    pub concurrency: usize,
    /// Also produce a translation into `reference_language`
    pub include_reference: bool,
    pub reference_language: String,
    pub phonetic_source: PhoneticSource,
    /// Extra instructions for the primary translation
    pub instructions: String,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            include_reference: true,
            reference_language: "en".to_string(),
            phonetic_source: PhoneticSource::Auto,
            instructions: prompts::BOOK_EDITOR_INSTRUCTIONS.to_string(),
        }
    }
}

/// Cooperative cancellation flag shared between the caller and a running batch
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Outcome counters of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl BatchSummary {
    pub fn from_records(records: &[TranslationRecord], duration: Duration) -> Self {
        Self {
            total: records.len(),
            failed: records.iter().filter(|r| r.is_error()).count(),
            duration,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks translated, {} failed, in {:.1}s",
            self.total - self.failed,
            self.failed,
            self.duration.as_secs_f64()
        )
    }
}

/// Bounded-concurrency batch translator
pub struct Orchestrator {
    client: Arc<TranslationClient>,
    options: OrchestratorOptions,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(client: Arc<TranslationClient>, options: OrchestratorOptions) -> Self {
        Self {
            client,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the batch early
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Effective worker count
    pub fn concurrency(&self) -> usize {
        self.options.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    pub fn client(&self) -> &Arc<TranslationClient> {
        &self.client
    }

    /// Translate every chunk, returning records ordered by chunk index.
    ///
    /// `progress` receives `100 * done / total` once per finished chunk; the
    /// last value is exactly 100. With no chunks it is called once with 100.
    /// After cancellation, chunks not yet started are recorded as failed and
    /// the call returns [`TranslationError::Cancelled`] holding every record.
    pub async fn run(
        &self,
        chunks: &[Chunk],
        pair: &LanguagePair,
        progress: impl Fn(f32) + Send + Sync,
    ) -> Result<Vec<TranslationRecord>, TranslationError> {
        let start_time = Instant::now();
        let total = chunks.len();
        if total == 0 {
            progress(100.0);
            return Ok(Vec::new());
        }

        let concurrency = self.concurrency();
        info!("Translating {} chunks with {} workers", total, concurrency);

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let completed = AtomicUsize::new(0);
        let progress = &progress;
        let completed = &completed;

        let mut records = stream::iter(chunks)
            .map(|chunk| {
                let semaphore = semaphore.clone();
                async move {
                    let record = match semaphore.acquire().await {
                        Ok(_permit) => self.process_chunk(chunk, pair).await,
                        Err(e) => TranslationRecord::failed(chunk, e.to_string()),
                    };

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress(done as f32 * 100.0 / total as f32);
                    record
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        // Restore document order
        records.sort_by_key(|record| record.index);

        let summary = BatchSummary::from_records(&records, start_time.elapsed());
        info!("{}", summary);

        if self.cancel.is_cancelled() {
            warn!("Batch cancelled");
            return Err(TranslationError::Cancelled { records });
        }
        Ok(records)
    }

    async fn process_chunk(&self, chunk: &Chunk, pair: &LanguagePair) -> TranslationRecord {
        if self.cancel.is_cancelled() {
            return TranslationRecord::failed(chunk, "cancelled");
        }

        let mut phonetic_gloss = match self.options.phonetic_source {
            PhoneticSource::Source | PhoneticSource::Auto if has_phonetic_system(&pair.source) => {
                non_empty(phonetic::pinyin_gloss(&chunk.text))
            }
            _ => None,
        };

        let reference_translation = self.reference_translation(&chunk.text, pair).await;

        let translation = self
            .client
            .translate(&chunk.text, &pair.source, &pair.target, &self.options.instructions)
            .await;

        let target_translation = match translation {
            Ok(text) => text,
            Err(e) => {
                warn!("Chunk {} failed: {}", chunk.index + 1, e);
                return TranslationRecord {
                    phonetic_gloss,
                    reference_translation,
                    ..TranslationRecord::failed(chunk, e.to_string())
                };
            }
        };

        if phonetic_gloss.is_none()
            && matches!(self.options.phonetic_source, PhoneticSource::Target | PhoneticSource::Auto)
            && has_phonetic_system(&pair.target)
        {
            phonetic_gloss = non_empty(phonetic::pinyin_gloss(&target_translation));
        }

        TranslationRecord {
            index: chunk.index,
            paragraph: chunk.paragraph,
            source_text: chunk.text.clone(),
            phonetic_gloss,
            reference_translation,
            target_translation,
            error_state: None,
        }
    }

    /// Secondary translation into the reference language.
    ///
    /// Skipped when the target already is the reference language; the source
    /// text itself is used when the source is. Failures only lose the gloss.
    async fn reference_translation(&self, text: &str, pair: &LanguagePair) -> Option<String> {
        let reference = &self.options.reference_language;
        if !self.options.include_reference || language_codes_match(&pair.target, reference) {
            return None;
        }
        if language_codes_match(&pair.source, reference) {
            return non_empty(text.to_string());
        }

        match self
            .client
            .translate(text, &pair.source, reference, prompts::REFERENCE_INSTRUCTIONS)
            .await
        {
            Ok(translation) => non_empty(translation),
            Err(e) => {
                warn!("Reference translation failed: {}", e);
                None
            }
        }
    }

    /// Break each paragraph into glossed words, preserving paragraph order
    pub async fn run_word_by_word(
        &self,
        paragraphs: &[String],
        pair: &LanguagePair,
        progress: impl Fn(f32) + Send + Sync,
    ) -> Vec<WordParagraph> {
        let total = paragraphs.len();
        if total == 0 {
            progress(100.0);
            return Vec::new();
        }

        let completed = AtomicUsize::new(0);
        let progress = &progress;
        let completed = &completed;

        let mut results = stream::iter(paragraphs.iter().enumerate())
            .map(|(index, text)| async move {
                let words = self
                    .client
                    .process_word_by_word(text, &pair.source, &pair.target)
                    .await;
                let reference_translation = self.reference_translation(text, pair).await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(done as f32 * 100.0 / total as f32);

                WordParagraph {
                    index,
                    words,
                    reference_translation,
                }
            })
            .buffer_unordered(self.concurrency())
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|paragraph| paragraph.index);
        results
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}
