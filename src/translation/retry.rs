/*!
 * Retry with exponential backoff for remote calls.
 *
 * One [`RetryPolicy`] decides everything about retrying: how often, how long
 * to wait, and which failures are worth another attempt.
 */

use std::future::Future;
use std::time::Duration;

use log::warn;
use rand::Rng;

use crate::errors::{ErrorKind, ProviderError, TranslationError};

/// Maps a provider error to its retry class
pub type ErrorClassifier = fn(&ProviderError) -> ErrorKind;

/// Retry and backoff settings
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each time
    pub base_delay: Duration,
    /// Minimum wait after a quota error
    pub quota_delay: Duration,
    /// Upper bound for the exponential part
    pub max_delay: Duration,
    /// Random extra wait of up to this fraction of the delay
    pub jitter: f64,
    pub classifier: ErrorClassifier,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1000),
            quota_delay: Duration::from_secs(20),
            max_delay: Duration::from_secs(60),
            jitter: 0.25,
            classifier: ProviderError::kind,
        }
    }
}

impl RetryPolicy {
    /// Policy without waits, for tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            quota_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: 0.0,
            ..Default::default()
        }
    }

    /// Wait before retry number `attempt` (1-based) after `error`, without jitter
    pub fn base_delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let exponential = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);

        match (self.classifier)(error) {
            ErrorKind::Quota => {
                // Hints are capped at the larger of the two bounds
                let hint_cap = self.max_delay.max(self.quota_delay);
                let hinted = error
                    .retry_after_secs()
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::ZERO)
                    .min(hint_cap);
                exponential.max(self.quota_delay).max(hinted)
            }
            _ => exponential,
        }
    }

    fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let delay = self.base_delay_for(attempt, error);
        if self.jitter <= 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = rand::rng().random_range(0.0..=self.jitter);
        delay + delay.mul_f64(factor)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Permanent errors come back as [`TranslationError::Provider`]; running out
    /// of attempts yields [`TranslationError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, model: &str, mut operation: F) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let kind = (self.classifier)(&error);
            if !kind.is_retryable() {
                return Err(TranslationError::Provider(error));
            }
            if attempt >= max_attempts {
                return Err(TranslationError::RetriesExhausted {
                    model: model.to_string(),
                    attempts: attempt,
                    last: error,
                });
            }

            let wait = self.delay_for(attempt, &error);
            warn!(
                "{} failed ({}); retrying in {:.1}s (attempt {}/{})",
                model,
                error,
                wait.as_secs_f32(),
                attempt,
                max_attempts
            );
            tokio::time::sleep(wait).await;
        }
    }
}
