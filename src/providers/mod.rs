/*!
 * Provider implementations for remote language models.
 *
 * This module contains the narrow interface the translation client talks to:
 * - `Provider`: plain text generation and schema-constrained JSON generation
 * - `gemini`: Google Gemini REST API
 * - `mock`: deterministic in-process provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod gemini;
pub mod mock;

/// Harm categories the Gemini API lets callers tune
pub const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Content-safety thresholds sent with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Threshold applied to every category in [`HARM_CATEGORIES`]
    pub threshold: String,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        // Books quote violence and slurs; translating them is not producing them
        Self {
            threshold: "BLOCK_NONE".to_string(),
        }
    }
}

/// A single generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// System instruction
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub safety: SafetyConfig,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            system: None,
            prompt: String::new(),
            temperature: 0.3,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            safety: SafetyConfig::default(),
        }
    }
}

impl GenerationRequest {
    /// Create a request for `model` with default sampling parameters
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token limit
    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Same request against another model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}

/// Common trait for remote language model providers
///
/// Implementations classify their failures through [`ProviderError`] so the
/// retry policy can tell quota exhaustion, transient and permanent errors apart.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Generate plain text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Generate JSON constrained by `schema`
    async fn generate_structured(
        &self,
        request: &GenerationRequest,
        schema: &Value,
    ) -> Result<Value, ProviderError>;

    /// Test the connection to the provider with a tiny request
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        let request = GenerationRequest::new(model, "Hello").max_output_tokens(10);
        self.generate(&request).await.map(|_| ())
    }
}
