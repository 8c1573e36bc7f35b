/*!
 * Error types for the transbook application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Remote failures are split into three classes (see [`ErrorKind`]): quota
 * exhaustion, other transient failures, and permanent failures. The retry policy
 * and the batch orchestrator both key off that classification.
 */

use thiserror::Error;

use crate::document::TranslationRecord;

/// Retry classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Quota or rate limit exhausted; retry after a long wait
    Quota,
    /// Server busy, network trouble; retry with backoff
    Transient,
    /// Bad credentials, policy block, malformed request; never retry
    Permanent,
}

impl ErrorKind {
    /// Whether a retry may succeed
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota exhaustion
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Message from the API
        message: String,
        /// Server-provided retry hint
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Prompt or response rejected by the provider's content policy
    #[error("Content blocked: {0}")]
    ContentBlocked(String),

    /// Request rejected as malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider answered without any text
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify this error for the retry policy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimitExceeded { .. } => ErrorKind::Quota,
            Self::ApiError { status_code, .. } => match *status_code {
                429 => ErrorKind::Quota,
                408 | 500..=599 => ErrorKind::Transient,
                _ => ErrorKind::Permanent,
            },
            Self::RequestFailed(_)
            | Self::ConnectionError(_)
            | Self::ParseError(_)
            | Self::EmptyResponse => ErrorKind::Transient,
            Self::AuthenticationError(_) | Self::ContentBlocked(_) | Self::InvalidRequest(_) => {
                ErrorKind::Permanent
            }
        }
    }

    /// Retry hint supplied by the server, if any
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { retry_after_secs, .. } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Error from the provider API that was not retried
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every allowed attempt failed with a retryable error
    #[error("Model {model} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Model that was being called
        model: String,
        /// Number of attempts made
        attempts: u32,
        /// Last error observed
        last: ProviderError,
    },

    /// Structured response did not match the expected shape
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// The batch was cancelled by the caller; chunks that never started are
    /// flagged "cancelled" in `records`
    #[error("Translation cancelled")]
    Cancelled { records: Vec<TranslationRecord> },
}

impl TranslationError {
    /// Whether this failure came from a permanent provider error
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Provider(e) => e.kind() == ErrorKind::Permanent,
            Self::RetriesExhausted { .. } | Self::SchemaValidation(_) | Self::Cancelled { .. } => false,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any processing began
    #[error("Input error: {0}")]
    Input(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
