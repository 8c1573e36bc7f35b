/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the text with the target language
 * - `MockProvider::transient(n)` - Fails the first `n` calls with a server error
 * - `MockProvider::rate_limited(n)` - Fails the first `n` calls with a quota error
 * - `MockProvider::failing()` - Always fails with a permanent error
 * - `MockProvider::fail_on_text(s)` - Fails permanently for texts containing `s`
 * - `MockProvider::jitter(ms)` - Succeeds after a random delay
 *
 * Clones share their call counters and call log.
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::Rng;
use regex::Regex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, Provider};
use crate::translation::prompts::SOURCE_MARKER;

static TARGET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Translate the following text from .+? to (.+?)\.$").unwrap());

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request with a server error
    Intermittent { fail_every: usize },
    /// Fails the first `failures` requests with a 503, then succeeds
    Transient { failures: usize },
    /// Fails the first `failures` requests with a quota error, then succeeds
    RateLimited { failures: usize },
    /// Always fails with a permanent error
    Failing,
    /// Fails permanently when the source text contains the needle
    FailOnText { needle: &'static str },
    /// Every call to this model fails with a server error; other models work
    FailModel { model: &'static str },
    /// Returns an empty string
    Empty,
    /// Simulates a slow response
    Slow { delay_ms: u64 },
    /// Succeeds after a random delay of up to `max_delay_ms`
    Jitter { max_delay_ms: u64 },
    /// Plain generation works, structured generation returns the wrong shape
    MalformedStructured,
    /// Plain generation works, structured generation is not valid JSON
    UnparseableStructured,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Models named by each request, in call order
    model_log: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&GenerationRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            model_log: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that fails its first `failures` calls with a server error
    pub fn transient(failures: usize) -> Self {
        Self::new(MockBehavior::Transient { failures })
    }

    /// Create a mock that fails its first `failures` calls with a quota error
    pub fn rate_limited(failures: usize) -> Self {
        Self::new(MockBehavior::RateLimited { failures })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that rejects texts containing `needle`
    pub fn fail_on_text(needle: &'static str) -> Self {
        Self::new(MockBehavior::FailOnText { needle })
    }

    /// Create a mock whose calls to `model` always fail
    pub fn fail_model(model: &'static str) -> Self {
        Self::new(MockBehavior::FailModel { model })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock with random response latency
    pub fn jitter(max_delay_ms: u64) -> Self {
        Self::new(MockBehavior::Jitter { max_delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&GenerationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Models requested so far, in call order
    pub fn requested_models(&self) -> Vec<String> {
        self.model_log.lock().clone()
    }

    /// Text being translated, as embedded in the prompt
    pub fn source_text(request: &GenerationRequest) -> &str {
        request
            .prompt
            .rsplit_once(SOURCE_MARKER)
            .map(|(_, text)| text)
            .unwrap_or(&request.prompt)
    }

    /// Default answer: the source text tagged with the target language
    pub fn default_translation(request: &GenerationRequest) -> String {
        let target = TARGET_REGEX
            .captures(&request.prompt)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or("?");
        format!("[{}] {}", target, Self::source_text(request))
    }

    fn respond(&self, request: &GenerationRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::default_translation(request),
        }
    }

    /// Count the call and apply the configured failure or delay
    async fn simulate(&self, request: &GenerationRequest) -> Result<(), ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.model_log.lock().push(request.model.clone());

        match self.behavior {
            MockBehavior::Working
            | MockBehavior::Empty
            | MockBehavior::MalformedStructured
            | MockBehavior::UnparseableStructured => Ok(()),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(())
                }
            }

            MockBehavior::Transient { failures } => {
                if count < failures {
                    Err(ProviderError::ApiError {
                        message: "Simulated overload".to_string(),
                        status_code: 503,
                    })
                } else {
                    Ok(())
                }
            }

            MockBehavior::RateLimited { failures } => {
                if count < failures {
                    Err(ProviderError::RateLimitExceeded {
                        message: "Simulated quota exhaustion".to_string(),
                        retry_after_secs: Some(0),
                    })
                } else {
                    Ok(())
                }
            }

            MockBehavior::Failing => Err(ProviderError::InvalidRequest(
                "Simulated provider failure".to_string(),
            )),

            MockBehavior::FailOnText { needle } => {
                if Self::source_text(request).contains(needle) {
                    Err(ProviderError::ContentBlocked(format!("Simulated block on '{}'", needle)))
                } else {
                    Ok(())
                }
            }

            MockBehavior::FailModel { model } => {
                if request.model == model {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated outage of {}", model),
                        status_code: 500,
                    })
                } else {
                    Ok(())
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(())
            }

            MockBehavior::Jitter { max_delay_ms } => {
                let delay = rand::rng().random_range(0..=max_delay_ms);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(())
            }
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            model_log: Arc::clone(&self.model_log),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.simulate(request).await?;

        if self.behavior == MockBehavior::Empty {
            return Ok(String::new());
        }
        Ok(self.respond(request))
    }

    async fn generate_structured(
        &self,
        request: &GenerationRequest,
        _schema: &Value,
    ) -> Result<Value, ProviderError> {
        self.simulate(request).await?;

        match self.behavior {
            MockBehavior::MalformedStructured => Ok(json!({"unexpected": true})),
            MockBehavior::UnparseableStructured => Err(ProviderError::ParseError(
                "expected value at line 1 column 1".to_string(),
            )),
            MockBehavior::Empty => Ok(json!({"words": []})),
            _ => {
                let words = Self::source_text(request)
                    .split_whitespace()
                    .map(|w| json!({"word": w, "pinyin": "", "translation": format!("<{}>", w)}))
                    .collect::<Vec<_>>();
                Ok(json!({ "words": words }))
            }
        }
    }
}
