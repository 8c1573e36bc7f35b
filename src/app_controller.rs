use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, TranslationMode};
use crate::document::{LanguagePair, PreparedDocument, SourceDocument};
use crate::file_utils::FileManager;
use crate::language_utils::{display_name, speech_tag};
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::render::{Renderer, render_document};
use crate::text::Chunker;
use crate::translation::{BatchSummary, CacheStats, CancellationToken, Orchestrator, TranslationClient};

// @module: Application controller wiring the translation pipeline

/// Result of translating one document
#[derive(Debug, Clone)]
pub struct BookOutput {
    /// Complete HTML document
    pub html: String,
    /// Units sent for translation: chunks, or paragraphs in word-by-word mode
    pub units: usize,
    /// Units that ended in an error record
    pub failed: usize,
    pub cache: CacheStats,
}

/// Main application controller for book translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Remote model backend
    provider: Arc<dyn Provider>,
    // @field: Shared with the orchestrator of every run
    cancel: CancellationToken,
}

impl Controller {
    // @method: Create a controller talking to Gemini
    pub fn with_config(config: Config) -> Result<Self> {
        let translation = &config.translation;
        let api_key = translation.resolved_api_key();
        if api_key.is_empty() {
            return Err(anyhow!("No Gemini API key configured"));
        }

        let provider = Gemini::new(api_key, translation.endpoint.clone(), translation.timeout_secs);
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    // @method: Create a controller over any provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            provider,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that stops the running translation when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fail early when the primary model cannot be reached
    pub async fn check_connection(&self) -> Result<()> {
        let client = self.client();
        client
            .test_connection()
            .await
            .with_context(|| format!("Connection test failed for {}", client.config().primary_model))
    }

    /// Translate `input_file` (or stdin for `-`) and write the HTML book.
    ///
    /// Returns the written path, or `None` when the output already exists and
    /// `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        let output_path = output_file.unwrap_or_else(|| {
            let output_dir = input_file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            FileManager::generate_output_path(&input_file, output_dir, &self.config.target_language)
        });
        if output_path.exists() && !force_overwrite {
            warn!("Skipping, output already exists: {:?} (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        let raw = FileManager::read_input(&input_file)?;
        let prepared = self.prepare(&raw)?;
        let units = match self.config.translation.mode {
            TranslationMode::Standard => prepared.chunk_count(),
            TranslationMode::WordByWord => prepared.paragraphs.len(),
        };

        info!(
            "transbook: {} -> {} with {} ({} units)",
            display_name(&self.config.source_language),
            display_name(&self.config.target_language),
            self.config.translation.primary_model,
            units
        );

        let progress_bar = Self::progress_bar(units as u64);
        let bar = progress_bar.clone();
        let output = self
            .translate_prepared(&prepared, move |percent| {
                bar.set_position((percent as f64 / 100.0 * units as f64).round() as u64);
            })
            .await;
        progress_bar.finish_and_clear();
        let output = output?;

        FileManager::write_to_file(&output_path, &output.html)?;

        if output.failed > 0 {
            warn!("{} of {} units failed and are flagged in the output", output.failed, output.units);
        }
        info!(
            "Cache: {} hits, {} misses ({:.0}% hit rate)",
            output.cache.hits,
            output.cache.misses,
            output.cache.hit_rate() * 100.0
        );
        info!(
            "Wrote {:?} in {}",
            output_path,
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(output_path))
    }

    /// Normalize and chunk raw input according to the configuration
    pub fn prepare(&self, raw: &str) -> Result<PreparedDocument> {
        let document = SourceDocument::new(raw)?;
        let prepared = Chunker::new(self.config.chunking.chunker_options()).prepare(document.text());
        if prepared.is_empty() {
            return Err(anyhow!("Input contains no translatable text"));
        }
        Ok(prepared)
    }

    /// Run the whole pipeline on raw text without touching the filesystem
    pub async fn translate_text(&self, raw: &str, progress: impl Fn(f32) + Send + Sync) -> Result<BookOutput> {
        let prepared = self.prepare(raw)?;
        self.translate_prepared(&prepared, progress).await
    }

    async fn translate_prepared(
        &self,
        prepared: &PreparedDocument,
        progress: impl Fn(f32) + Send + Sync,
    ) -> Result<BookOutput> {
        let pair = LanguagePair::new(&self.config.source_language, &self.config.target_language)?;
        let template_path = self.config.output.template_path.as_deref().map(Path::new);
        let template = FileManager::load_template(template_path)?;

        let client = self.client();
        let orchestrator = Orchestrator::new(client.clone(), self.config.translation.orchestrator_options())
            .with_cancellation(self.cancel.clone());
        let renderer = Renderer {
            show_reference: self.config.translation.include_reference && !self.config.output.hide_reference,
            speech_language: speech_tag(&pair.source),
        };

        let (body, units, failed) = match self.config.translation.mode {
            TranslationMode::Standard => {
                let records = orchestrator
                    .run(&prepared.chunks(), &pair, progress)
                    .await
                    .context("Translation stopped")?;
                let summary = BatchSummary::from_records(&records, Duration::ZERO);
                (renderer.render(&records), summary.total, summary.failed)
            }
            TranslationMode::WordByWord => {
                let texts: Vec<String> = prepared.paragraphs.iter().map(|p| p.text.clone()).collect();
                let paragraphs = orchestrator.run_word_by_word(&texts, &pair, progress).await;
                (renderer.render_interactive(&paragraphs), paragraphs.len(), 0)
            }
        };

        let html = render_document(&template, &body).context("Failed to render the HTML book")?;

        Ok(BookOutput {
            html,
            units,
            failed,
            cache: client.cache_stats(),
        })
    }

    fn client(&self) -> Arc<TranslationClient> {
        Arc::new(TranslationClient::new(
            self.provider.clone(),
            self.config.translation.client_config(),
        ))
    }

    fn progress_bar(total: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{:.1}s", duration.as_secs_f32())
        }
    }
}
