//! Retry of model HTTP requests with exponential backoff.
//!
//! A request attempt fails with a [`RequestFailure`] that keeps the HTTP
//! status or the transport error kind, so transient failures are recognised
//! without inspecting error text. Only after the last attempt is the failure
//! turned into a [`DuetError::Model`].

use duet_core::DuetError;
use std::fmt;
use std::{future::Future, time::Duration};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

/// How a request failed before any response arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// The configured request timeout elapsed.
    Timeout,
    /// The connection could not be established or was dropped.
    Connect,
    Other,
}

/// Why one request attempt failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestFailure {
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// No response was received.
    Transport { kind: TransportKind, message: String },
}

impl RequestFailure {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status { status, body: body.into() }
    }

    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport { kind, message: message.into() }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => is_retryable_status_code(*status),
            Self::Transport { kind, .. } => {
                matches!(kind, TransportKind::Timeout | TransportKind::Connect)
            }
        }
    }

    /// Model error naming the provider and endpoint the request went to.
    pub fn into_model_error(self, provider: &str, endpoint: &str) -> DuetError {
        DuetError::Model(format!("{provider} error for endpoint={endpoint}, {self}"))
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => write!(f, "status={status}: {body}"),
            Self::Transport { kind: TransportKind::Timeout, message } => {
                write!(f, "request timed out: {message}")
            }
            Self::Transport { kind: TransportKind::Connect, message } => {
                write!(f, "connection failed: {message}")
            }
            Self::Transport { kind: TransportKind::Other, message } => {
                write!(f, "request failed: {message}")
            }
        }
    }
}

#[must_use]
pub fn is_retryable_status_code(status_code: u16) -> bool {
    matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
}

fn next_retry_delay(current: Duration, retry_config: &RetryConfig) -> Duration {
    if current >= retry_config.max_delay {
        return retry_config.max_delay;
    }

    let multiplier = retry_config.backoff_multiplier.max(1.0) as f64;
    let scaled = Duration::from_secs_f64(current.as_secs_f64() * multiplier);
    scaled.min(retry_config.max_delay)
}

/// Run `operation` until it succeeds, fails with a non-retryable failure, or
/// the retry budget is spent. The last failure is returned as-is.
pub async fn execute_with_retry<T, Op, Fut>(
    retry_config: &RetryConfig,
    mut operation: Op,
) -> Result<T, RequestFailure>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestFailure>>,
{
    if !retry_config.enabled {
        return operation().await;
    }

    let mut attempt: u32 = 0;
    let mut delay = retry_config.initial_delay;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(failure) if attempt < retry_config.max_retries && failure.is_retryable() => {
                attempt += 1;
                duet_telemetry::warn!(
                    attempt = attempt,
                    max_retries = retry_config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %failure,
                    "Provider request failed with retryable error; retrying"
                );
                tokio::time::sleep(delay).await;
                delay = next_retry_delay(delay, retry_config);
            }
            Err(failure) => return Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    fn fast() -> RetryConfig {
        RetryConfig::default().with_initial_delay(Duration::ZERO).with_max_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn execute_with_retry_retries_transient_status() {
        let retry_config = fast().with_max_retries(2);
        let attempts = Arc::new(AtomicU32::new(0));

        let result = execute_with_retry(&retry_config, || {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    return Err(RequestFailure::status(429, "slow down"));
                }
                Ok("ok")
            }
        })
        .await
        .expect("operation should succeed after retries");

        assert_eq!(result, "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn execute_with_retry_retries_timeouts_until_budget_is_spent() {
        let retry_config = fast().with_max_retries(2);
        let attempts = Arc::new(AtomicU32::new(0));

        let failure = execute_with_retry(&retry_config, || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestFailure::transport(TransportKind::Timeout, "no reply"))
            }
        })
        .await
        .expect_err("operation should fail once retries run out");

        assert_eq!(failure, RequestFailure::transport(TransportKind::Timeout, "no reply"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn execute_with_retry_stops_on_non_retryable_failure() {
        let retry_config = fast().with_max_retries(3);
        let attempts = Arc::new(AtomicU32::new(0));

        let failure = execute_with_retry(&retry_config, || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestFailure::status(400, "bad request"))
            }
        })
        .await
        .expect_err("operation should fail without retries");

        assert!(matches!(failure, RequestFailure::Status { status: 400, .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_with_retry_respects_disabled_config() {
        let retry_config = RetryConfig::disabled().with_max_retries(10);
        let attempts = Arc::new(AtomicU32::new(0));

        let failure = execute_with_retry(&retry_config, || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RequestFailure::status(429, "too many requests"))
            }
        })
        .await
        .expect_err("disabled retry should return the first failure");

        assert!(matches!(failure, RequestFailure::Status { status: 429, .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transport_failures_classify_by_kind() {
        assert!(RequestFailure::transport(TransportKind::Timeout, "x").is_retryable());
        assert!(RequestFailure::transport(TransportKind::Connect, "x").is_retryable());
        assert!(!RequestFailure::transport(TransportKind::Other, "x").is_retryable());
        assert!(!RequestFailure::status(401, "invalid api key").is_retryable());
    }

    #[test]
    fn model_error_keeps_status_and_body() {
        let error = RequestFailure::status(503, "busy").into_model_error("Azure AI", "https://e");
        match error {
            DuetError::Model(message) => {
                assert_eq!(message, "Azure AI error for endpoint=https://e, status=503: busy");
            }
            other => panic!("expected model error, got {other:?}"),
        }
    }
}
