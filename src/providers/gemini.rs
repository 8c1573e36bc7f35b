use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{GenerationRequest, HARM_CATEGORIES, Provider};
use crate::errors::ProviderError;

/// Public Gemini REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client for the `generateContent` API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as `x-goog-api-key`
    api_key: String,
    /// API base URL, without trailing slash
    endpoint: String,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint,
        }
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        debug!("Gemini request to model {}", model);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            error!("Gemini API error ({}): {}", status, text);
            return Err(classify_error(status.as_u16(), retry_after, &text));
        }

        extract_text(&text)
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = build_body(request, None);
        self.generate_content(&request.model, &body).await
    }

    async fn generate_structured(
        &self,
        request: &GenerationRequest,
        schema: &Value,
    ) -> Result<Value, ProviderError> {
        let body = build_body(request, Some(schema));
        let text = self.generate_content(&request.model, &body).await?;
        serde_json::from_str(&text).map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Assemble the `generateContent` payload
pub fn build_body(request: &GenerationRequest, schema: Option<&Value>) -> Value {
    let mut generation_config = json!({
        "temperature": request.temperature,
        "topP": request.top_p,
        "topK": request.top_k,
        "maxOutputTokens": request.max_output_tokens,
    });
    if let Some(schema) = schema {
        generation_config["responseMimeType"] = json!("application/json");
        generation_config["responseSchema"] = schema.clone();
    }

    let safety_settings = HARM_CATEGORIES
        .iter()
        .map(|category| json!({"category": category, "threshold": request.safety.threshold}))
        .collect::<Vec<_>>();

    let mut body = json!({
        "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
        "generationConfig": generation_config,
        "safetySettings": safety_settings,
    });
    if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        body["systemInstruction"] = json!({"parts": [{"text": system}]});
    }
    body
}

/// Pull the candidate text out of a successful response body
pub fn extract_text(body: &str) -> Result<String, ProviderError> {
    let payload: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Gemini response JSON: {}", e)))?;

    if let Some(reason) = payload.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::ContentBlocked(format!("prompt blocked: {}", reason)));
    }

    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if matches!(
        candidate.finish_reason.as_deref(),
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST")
    ) {
        return Err(ProviderError::ContentBlocked(format!(
            "response blocked: {}",
            candidate.finish_reason.unwrap_or_default()
        )));
    }

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

/// Map a failed HTTP exchange onto the provider error taxonomy
pub fn classify_error(status: u16, retry_after: Option<u64>, body: &str) -> ProviderError {
    let parsed = parse_error_body(body);
    let api_status = parsed.as_ref().and_then(|e| e.status.clone()).unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        let hinted = parsed.as_ref().and_then(retry_delay_hint);
        return ProviderError::RateLimitExceeded {
            message,
            retry_after_secs: retry_after.or(hinted),
        };
    }

    match status {
        401 | 403 => ProviderError::AuthenticationError(message),
        _ if api_status == "UNAUTHENTICATED" || api_status == "PERMISSION_DENIED" => {
            ProviderError::AuthenticationError(message)
        }
        400 if message.contains("API key") => ProviderError::AuthenticationError(message),
        400 => ProviderError::InvalidRequest(message),
        _ => ProviderError::ApiError {
            status_code: status,
            message,
        },
    }
}

fn parse_error_body(body: &str) -> Option<GeminiError> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<GeminiError>,
    }

    serde_json::from_str::<ErrorBody>(body).ok()?.error
}

// RetryInfo detail carries e.g. "retryDelay": "17s"
fn retry_delay_hint(error: &GeminiError) -> Option<u64> {
    error.details.iter().find_map(|detail| {
        let delay = detail.get("retryDelay")?.as_str()?;
        let seconds = delay.trim_end_matches('s').parse::<f64>().ok()?;
        Some(seconds.ceil() as u64)
    })
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}
