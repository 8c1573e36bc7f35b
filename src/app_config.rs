use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::language_utils::{language_codes_match, validate_language_code};
use crate::providers::SafetyConfig;
use crate::providers::gemini::DEFAULT_ENDPOINT;
use crate::text::{ChunkMode, ChunkerOptions, NormalizerOptions};
use crate::translation::core::{DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};
use crate::translation::{ClientConfig, OrchestratorOptions, PhoneticSource, RetryPolicy};

/// Environment variable consulted when the config file has no API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and converting settings into the pipeline's option types.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Text preparation config
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Output config
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the document is translated
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMode {
    /// Chunk-by-chunk translation with optional reference and pinyin lines
    #[default]
    Standard,
    /// Interactive word-by-word glossing of each paragraph
    WordByWord,
}

impl std::str::FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Self::Standard),
            "word_by_word" | "words" => Ok(Self::WordByWord),
            _ => Err(anyhow!("Invalid translation mode: {}", s)),
        }
    }
}

/// Remote model and orchestration settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Gemini API key; falls back to the GEMINI_API_KEY environment variable
    #[serde(default)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model tried first
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Model used once the primary gives up; empty disables fallback
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Safety threshold for every harm category
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,

    /// Chunks translated at once
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Attempts per model, including the first
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled per retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Minimum wait after a quota error, in seconds
    #[serde(default = "default_quota_delay_secs")]
    pub quota_delay_secs: u64,

    /// Cap on the exponential backoff, in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    #[serde(default)]
    pub mode: TranslationMode,

    /// Add a translation into the reference language
    #[serde(default = "default_true")]
    pub include_reference: bool,

    #[serde(default = "default_reference_language")]
    pub reference_language: String,

    #[serde(default)]
    pub phonetic_source: PhoneticSource,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            safety_threshold: default_safety_threshold(),
            concurrent_requests: default_concurrent_requests(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            quota_delay_secs: default_quota_delay_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            cache_enabled: true,
            mode: TranslationMode::default(),
            include_reference: true,
            reference_language: default_reference_language(),
            phonetic_source: PhoneticSource::default(),
        }
    }
}

impl TranslationConfig {
    /// API key from the config, else from the environment
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.trim().is_empty() {
            return self.api_key.trim().to_string();
        }
        std::env::var(API_KEY_ENV).unwrap_or_default().trim().to_string()
    }

    /// Retry policy built from the backoff settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_count,
            base_delay: Duration::from_millis(self.retry_backoff_ms),
            quota_delay: Duration::from_secs(self.quota_delay_secs),
            max_delay: Duration::from_secs(self.max_backoff_secs),
            ..Default::default()
        }
    }

    /// Settings for the translation client
    pub fn client_config(&self) -> ClientConfig {
        let fallback = self.fallback_model.trim();
        ClientConfig {
            primary_model: self.primary_model.trim().to_string(),
            fallback_model: (!fallback.is_empty()).then(|| fallback.to_string()),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            safety: SafetyConfig {
                threshold: self.safety_threshold.clone(),
            },
            retry: self.retry_policy(),
            cache_enabled: self.cache_enabled,
        }
    }

    /// Settings for the batch orchestrator
    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            concurrency: self.concurrent_requests,
            include_reference: self.include_reference,
            reference_language: self.reference_language.clone(),
            phonetic_source: self.phonetic_source,
            ..Default::default()
        }
    }
}

/// Text normalization and chunking settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Soft character budget per chunk
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Minimum chunk length in sentence mode
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,

    #[serde(default)]
    pub mode: ChunkMode,

    /// Break at clause marks in sentence mode
    #[serde(default)]
    pub clause_level: bool,

    /// Repair ligatures, soft hyphens and similar PDF artifacts
    #[serde(default = "default_true")]
    pub fix_artifacts: bool,

    /// Treat every newline as a paragraph break
    #[serde(default)]
    pub line_breaks_are_paragraphs: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_sentence_chars: default_min_sentence_chars(),
            mode: ChunkMode::default(),
            clause_level: false,
            fix_artifacts: true,
            line_breaks_are_paragraphs: false,
        }
    }
}

impl ChunkingConfig {
    pub fn chunker_options(&self) -> ChunkerOptions {
        ChunkerOptions {
            budget: self.max_chars,
            min_sentence_chars: self.min_sentence_chars,
            clause_level: self.clause_level,
            mode: self.mode,
            normalizer: NormalizerOptions {
                fix_artifacts: self.fix_artifacts,
                line_breaks_are_paragraphs: self.line_breaks_are_paragraphs,
            },
        }
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// HTML template with a single {{content}} placeholder; bundled template when unset
    #[serde(default)]
    pub template_path: Option<String>,

    /// Hide the reference-language line even when it was produced
    #[serde(default)]
    pub hide_reference: bool,
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "zh".to_string()
}

fn default_target_language() -> String {
    "vi".to_string()
}

fn default_reference_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_primary_model() -> String {
    DEFAULT_PRIMARY_MODEL.to_string()
}

fn default_fallback_model() -> String {
    DEFAULT_FALLBACK_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_safety_threshold() -> String {
    SafetyConfig::default().threshold
}

fn default_concurrent_requests() -> usize {
    3
}

fn default_retry_count() -> u32 {
    4
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_quota_delay_secs() -> u64 {
    20
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_max_chars() -> usize {
    800
}

fn default_min_sentence_chars() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Check the configuration before any work starts
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        for (label, code) in [
            ("source", &self.source_language),
            ("target", &self.target_language),
            ("reference", &self.translation.reference_language),
        ] {
            validate_language_code(code).map_err(|e| anyhow!("Invalid {} language: {}", label, e))?;
        }
        if language_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target language must differ (both are '{}')",
                self.source_language
            ));
        }

        let translation = &self.translation;
        if translation.resolved_api_key().is_empty() {
            return Err(anyhow!(
                "Gemini API key is required (set translation.api_key or {})",
                API_KEY_ENV
            ));
        }
        Url::parse(&translation.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint '{}': {}", translation.endpoint, e))?;
        if translation.primary_model.trim().is_empty() {
            return Err(anyhow!("Primary model must not be empty"));
        }
        if !(1..=16).contains(&translation.concurrent_requests) {
            return Err(anyhow!(
                "concurrent_requests must be between 1 and 16, got {}",
                translation.concurrent_requests
            ));
        }
        if !(1..=10).contains(&translation.retry_count) {
            return Err(anyhow!("retry_count must be between 1 and 10, got {}", translation.retry_count));
        }
        if !(0.0..=2.0).contains(&translation.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 2.0, got {}", translation.temperature));
        }

        let chunking = &self.chunking;
        if !(100..=10_000).contains(&chunking.max_chars) {
            return Err(anyhow!("max_chars must be between 100 and 10000, got {}", chunking.max_chars));
        }
        if chunking.min_sentence_chars > chunking.max_chars {
            return Err(anyhow!("min_sentence_chars must not exceed max_chars"));
        }

        if let Some(path) = &self.output.template_path {
            if !Path::new(path).is_file() {
                return Err(anyhow!("Template file not found: {}", path));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            chunking: ChunkingConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
