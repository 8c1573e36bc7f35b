/*!
 * Tests for the retry policy against each error class
 */

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use transbook::errors::{ErrorKind, ProviderError, TranslationError};
use transbook::translation::RetryPolicy;

fn quota() -> ProviderError {
    ProviderError::RateLimitExceeded {
        message: "RESOURCE_EXHAUSTED".to_string(),
        retry_after_secs: None,
    }
}

#[tokio::test]
async fn test_run_quotaError_shouldRetryThenSucceed() {
    let calls = &AtomicU32::new(0);
    let result = RetryPolicy::immediate(3)
        .run("gemini", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 { Err(quota()) } else { Ok(42) }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_run_errorClasses_shouldDetermineAttemptCount() {
    let cases = [
        (ProviderError::ConnectionError("reset".to_string()), 3),
        (ProviderError::EmptyResponse, 3),
        (quota(), 3),
        (ProviderError::ContentBlocked("SAFETY".to_string()), 1),
        (ProviderError::InvalidRequest("bad".to_string()), 1),
        (ProviderError::ApiError { status_code: 404, message: "no model".to_string() }, 1),
    ];

    for (error, expected_calls) in cases {
        let calls = &AtomicU32::new(0);
        let error = &error;
        let _: Result<(), _> = RetryPolicy::immediate(3)
            .run("gemini", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(error.clone())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), expected_calls, "wrong attempt count for {}", error);
    }
}

#[tokio::test]
async fn test_run_exhausted_shouldCarryModelAndLastError() {
    let result: Result<(), _> = RetryPolicy::immediate(2)
        .run("gemini-1.5-flash", || async { Err(ProviderError::ConnectionError("down".to_string())) })
        .await;

    match result {
        Err(TranslationError::RetriesExhausted { model, attempts, last }) => {
            assert_eq!(model, "gemini-1.5-flash");
            assert_eq!(attempts, 2);
            assert!(matches!(last, ProviderError::ConnectionError(_)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_run_zeroAttempts_shouldStillTryOnce() {
    let calls = &AtomicU32::new(0);
    let _: Result<(), _> = RetryPolicy::immediate(0)
        .run("m", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::EmptyResponse)
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_baseDelayFor_quota_shouldNotUndercutExponential() {
    let policy = RetryPolicy {
        base_delay: Duration::from_secs(8),
        quota_delay: Duration::from_secs(10),
        max_delay: Duration::from_secs(60),
        ..Default::default()
    };
    // 8s * 2^2 = 32s beats the 10s quota floor
    assert_eq!(policy.base_delay_for(3, &quota()), Duration::from_secs(32));
}

#[test]
fn test_kind_shouldClassifyStatusCodes() {
    let api = |status_code| ProviderError::ApiError { status_code, message: String::new() };
    assert_eq!(api(429).kind(), ErrorKind::Quota);
    assert_eq!(api(503).kind(), ErrorKind::Transient);
    assert_eq!(api(408).kind(), ErrorKind::Transient);
    assert_eq!(api(400).kind(), ErrorKind::Permanent);
    assert!(!ErrorKind::Permanent.is_retryable());
}
