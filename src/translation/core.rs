/*!
 * Core translation client.
 *
 * `TranslationClient` wraps a [`Provider`] with the translation cache, the
 * retry policy and primary-to-secondary model fallback. It is built once per
 * run and shared by `Arc` between the orchestrator's workers.
 */

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::document::WordGloss;
use crate::errors::{ErrorKind, ProviderError, TranslationError};
use crate::language_utils::{contains_han, display_name};
use crate::phonetic;
use crate::providers::{GenerationRequest, Provider, SafetyConfig};

use super::cache::{CacheStats, TranslationCache, truncate_text};
use super::prompts;
use super::retry::RetryPolicy;

/// Default fast model
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-1.5-flash";

/// Default model used after the primary gives up
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-pro";

/// Settings of a [`TranslationClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Model tried first
    pub primary_model: String,
    /// Model tried once the primary exhausted its retries; `None` disables fallback
    pub fallback_model: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub safety: SafetyConfig,
    pub retry: RetryPolicy,
    pub cache_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            temperature: 0.3,
            max_output_tokens: 8192,
            safety: SafetyConfig::default(),
            retry: RetryPolicy::default(),
            cache_enabled: true,
        }
    }
}

/// Cached, retrying translation client
#[derive(Debug)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    config: ClientConfig,
    cache: TranslationCache,
}

impl TranslationClient {
    /// Create a client over `provider`
    pub fn new(provider: Arc<dyn Provider>, config: ClientConfig) -> Self {
        let cache = TranslationCache::new(config.cache_enabled);
        Self {
            provider,
            config,
            cache,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Hit/miss statistics of the translation cache
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Send a tiny request to the primary model
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        info!("Testing connection to {}", self.config.primary_model);
        self.provider.test_connection(&self.config.primary_model).await
    }

    /// Translate `text` from `source` to `target` language codes.
    ///
    /// Blank text yields an empty string without a remote call. Successful
    /// results are cached under (text, source, target); failures are not.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        instructions: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        if let Some(cached) = self.cache.get(text, source, target) {
            return Ok(cached);
        }

        let prompt = prompts::translation_prompt(text, &display_name(source), &display_name(target), instructions);
        let request = self.request(prompt);

        let translation = self.generate_with_fallback(&request).await?;
        self.cache.store(text, source, target, &translation);
        debug!("Translated '{}' -> '{}'", truncate_text(text, 30), truncate_text(&translation, 30));

        Ok(translation)
    }

    /// Word-by-word breakdown of `text`.
    ///
    /// Asks the primary model for structured output; on any failure falls back
    /// to local segmentation with local pinyin and empty meanings. Never fails.
    pub async fn process_word_by_word(&self, text: &str, source: &str, target: &str) -> Vec<WordGloss> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        match self.request_word_glosses(text, source, target).await {
            Ok(words) => words,
            Err(e) => {
                warn!(
                    "Word-by-word request failed for '{}', using local segmentation: {}",
                    truncate_text(text, 30),
                    e
                );
                phonetic::local_word_glosses(text)
            }
        }
    }

    async fn request_word_glosses(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Vec<WordGloss>, TranslationError> {
        let prompt = prompts::word_by_word_prompt(text, &display_name(source), &display_name(target));
        let request = &self.request(prompt);
        let schema = &prompts::word_schema();

        // Undecodable JSON goes to the local fallback without another paid call
        let policy = RetryPolicy {
            classifier: structured_error_kind,
            ..self.config.retry.clone()
        };
        let value = policy
            .run(&request.model, move || self.provider.generate_structured(request, schema))
            .await
            .map_err(|e| match e {
                TranslationError::Provider(ProviderError::ParseError(message)) => {
                    TranslationError::SchemaValidation(message)
                }
                other => other,
            })?;

        parse_word_glosses(&value)
    }

    fn request(&self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            model: self.config.primary_model.clone(),
            system: Some(prompts::SYSTEM_PROMPT.to_string()),
            prompt,
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
            safety: self.config.safety.clone(),
            ..Default::default()
        }
    }

    async fn generate_with_fallback(&self, request: &GenerationRequest) -> Result<String, TranslationError> {
        let primary = self.generate_trimmed(request).await;

        let fallback_model = match (&primary, &self.config.fallback_model) {
            (Err(TranslationError::RetriesExhausted { .. }), Some(model))
                if *model != request.model =>
            {
                model
            }
            _ => return primary,
        };

        if let Err(e) = &primary {
            warn!("{}; falling back to {}", e, fallback_model);
        }
        self.generate_trimmed(&request.with_model(fallback_model)).await
    }

    async fn generate_trimmed(&self, request: &GenerationRequest) -> Result<String, TranslationError> {
        self.config
            .retry
            .run(&request.model, move || async move {
                let text = self.provider.generate(request).await?;
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(ProviderError::EmptyResponse);
                }
                Ok(trimmed.to_string())
            })
            .await
    }
}

fn structured_error_kind(error: &ProviderError) -> ErrorKind {
    match error {
        ProviderError::ParseError(_) => ErrorKind::Permanent,
        other => other.kind(),
    }
}

/// Validate a `{"words": [...]}` response into glosses.
///
/// Missing pinyin for Han words is filled locally.
pub fn parse_word_glosses(value: &Value) -> Result<Vec<WordGloss>, TranslationError> {
    let items = value
        .get("words")
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::SchemaValidation("missing 'words' array".to_string()))?;

    if items.is_empty() {
        return Err(TranslationError::SchemaValidation("empty 'words' array".to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = |name: &str| -> Result<String, TranslationError> {
                item.get(name)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        TranslationError::SchemaValidation(format!("word {} lacks '{}'", i, name))
                    })
            };

            let word = field("word")?;
            if word.trim().is_empty() {
                return Err(TranslationError::SchemaValidation(format!("word {} is blank", i)));
            }
            let mut reading = field("pinyin")?;
            if reading.trim().is_empty() && contains_han(&word) {
                reading = phonetic::word_pinyin(&word);
            }

            Ok(WordGloss {
                word,
                phonetic: reading,
                meaning: field("translation")?,
            })
        })
        .collect()
}
