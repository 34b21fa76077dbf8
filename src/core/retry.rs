//! Retry-until-timeout for AWS API calls.
//!
//! The operation is polled until it succeeds, fails with an error that is not
//! retryable, or the deadline elapses. Waits between attempts start at
//! `max(initial, min)` and double after every wait, capped at `max_interval`.
//! When the deadline elapses the last retryable error is handed back
//! unchanged; an attempt still in flight at that moment is dropped.

use crate::core::aws_error::{is_aws_err_code_in, is_aws_err};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Deadline used by [`retry_on_aws_code`].
pub const AWS_CODE_RETRY_TIMEOUT: Duration = Duration::from_secs(120);
/// Deadline used by [`retry_on_aws_codes`].
pub const AWS_CODES_RETRY_TIMEOUT: Duration = Duration::from_secs(60);

fn default_initial_interval_ms() -> u64 {
    100
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_max_interval_ms() -> u64 {
    10_000
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RetryConfigFile")]
pub struct RetryConfig {
    /// Wall-clock deadline for the whole retry loop, in milliseconds.
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

/// `[retry]` table as written in config files. The deadline may be given as
/// `timeout_ms` or `timeout_seconds`; `timeout_ms` wins when both are set.
#[derive(Debug, Deserialize)]
struct RetryConfigFile {
    timeout_ms: Option<u64>,
    timeout_seconds: Option<u64>,
    #[serde(default = "default_initial_interval_ms")]
    initial_interval_ms: u64,
    #[serde(default = "default_min_interval_ms")]
    min_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    max_interval_ms: u64,
}

impl From<RetryConfigFile> for RetryConfig {
    fn from(file: RetryConfigFile) -> Self {
        let timeout_ms = file
            .timeout_ms
            .or_else(|| file.timeout_seconds.map(|secs| secs.saturating_mul(1000)))
            .unwrap_or(AWS_CODE_RETRY_TIMEOUT.as_millis() as u64);
        Self {
            timeout_ms,
            initial_interval_ms: file.initial_interval_ms,
            min_interval_ms: file.min_interval_ms,
            max_interval_ms: file.max_interval_ms,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: AWS_CODE_RETRY_TIMEOUT.as_millis() as u64,
            initial_interval_ms: default_initial_interval_ms(),
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
        }
    }
}

impl RetryConfig {
    pub fn new(timeout: Duration) -> Self {
        Self::default().with_timeout(timeout)
    }

    /// Two-minute deadline for a single retryable code.
    pub fn for_aws_code() -> Self {
        Self::new(AWS_CODE_RETRY_TIMEOUT)
    }

    /// One-minute deadline for a list of retryable codes.
    pub fn for_aws_codes() -> Self {
        Self::new(AWS_CODES_RETRY_TIMEOUT)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_initial_interval_ms(mut self, initial_interval_ms: u64) -> Self {
        self.initial_interval_ms = initial_interval_ms;
        self
    }

    pub fn with_min_interval_ms(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    pub fn with_max_interval_ms(mut self, max_interval_ms: u64) -> Self {
        self.max_interval_ms = max_interval_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Wait before the attempt following `attempt` (zero-based).
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_interval_ms.max(self.min_interval_ms);
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let wait_ms = base_ms.saturating_mul(factor).min(self.max_interval_ms);
        Duration::from_millis(wait_ms)
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<()> {
        validate_range("retry.timeout_ms", self.timeout_ms, 1, 3_600_000)?;
        validate_positive_number(
            "retry.min_interval_ms",
            self.initial_interval_ms.max(self.min_interval_ms),
            1,
        )?;
        validate_positive_number("retry.max_interval_ms", self.max_interval_ms, 1)?;
        validate_positive_number(
            "retry.max_interval_ms",
            self.max_interval_ms,
            self.min_interval_ms,
        )?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// The operation's own error: either not retryable, or the last retryable
    /// error seen before the deadline.
    #[error("{0}")]
    Operation(E),

    /// The deadline elapsed before any attempt completed.
    #[error("timeout while waiting for operation after {0:?}")]
    Timeout(Duration),
}

impl<E> RetryError<E> {
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Timeout(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::Timeout(_))
    }
}

/// Polls `operation` until it succeeds, returns an error `is_retryable`
/// rejects, or `config.timeout()` elapses.
pub async fn retry_until_timeout<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut is_retryable: P,
    mut operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: Display,
{
    let timeout = config.timeout();
    let mut last_error: Option<E> = None;

    let polling = async {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if is_retryable(&err) => {
                    let backoff = config.backoff_duration(attempt);
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retryable error, backing off"
                    );
                    last_error = Some(err);
                    attempt = attempt.saturating_add(1);
                    sleep(backoff).await;
                }
                Err(err) => {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %err,
                        "Non-retryable error"
                    );
                    return Err(err);
                }
            }
        }
    };

    let outcome = tokio::time::timeout(timeout, polling).await;
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(RetryError::Operation(err)),
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = timeout.as_millis() as u64,
                "Retry deadline elapsed"
            );
            match last_error {
                Some(err) => Err(RetryError::Operation(err)),
                None => Err(RetryError::Timeout(timeout)),
            }
        }
    }
}

/// Retries `operation` for up to two minutes while it fails with AWS error
/// code `code`.
pub async fn retry_on_aws_code<T, E, F, Fut>(
    code: &str,
    operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: ProvideErrorMetadata + Display,
{
    retry_on_aws_code_with_config(&RetryConfig::for_aws_code(), code, operation).await
}

pub async fn retry_on_aws_code_with_config<T, E, F, Fut>(
    config: &RetryConfig,
    code: &str,
    operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: ProvideErrorMetadata + Display,
{
    retry_until_timeout(
        config,
        "aws_code",
        |err: &E| is_aws_err(err, code, ""),
        operation,
    )
    .await
}

/// Retries `operation` for up to one minute while it fails with any of the
/// AWS error codes in `codes`.
pub async fn retry_on_aws_codes<T, E, F, Fut, S>(
    codes: &[S],
    operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: ProvideErrorMetadata + Display,
    S: AsRef<str>,
{
    retry_on_aws_codes_with_config(&RetryConfig::for_aws_codes(), codes, operation).await
}

pub async fn retry_on_aws_codes_with_config<T, E, F, Fut, S>(
    config: &RetryConfig,
    codes: &[S],
    operation: F,
) -> std::result::Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: ProvideErrorMetadata + Display,
    S: AsRef<str>,
{
    retry_until_timeout(
        config,
        "aws_codes",
        |err: &E| is_aws_err_code_in(err, codes),
        operation,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_smithy_types::error::ErrorMetadata;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn aws_error(code: &str) -> ErrorMetadata {
        ErrorMetadata::builder()
            .code(code)
            .message("simulated failure")
            .build()
    }

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.initial_interval_ms, 100);
        assert_eq!(config.min_interval_ms, 500);
        assert_eq!(config.max_interval_ms, 10_000);

        assert_eq!(RetryConfig::for_aws_code().timeout(), Duration::from_secs(120));
        assert_eq!(RetryConfig::for_aws_codes().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_schedule() {
        let config = RetryConfig::default();
        let waits: Vec<u64> = (0..8)
            .map(|attempt| config.backoff_duration(attempt).as_millis() as u64)
            .collect();
        assert_eq!(waits, vec![500, 1000, 2000, 4000, 8000, 10_000, 10_000, 10_000]);
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_duration(200), Duration::from_millis(10_000));
    }

    #[test]
    fn test_backoff_initial_above_min() {
        let config = RetryConfig::default()
            .with_initial_interval_ms(750)
            .with_max_interval_ms(2000);
        assert_eq!(config.backoff_duration(0), Duration::from_millis(750));
        assert_eq!(config.backoff_duration(1), Duration::from_millis(1500));
        assert_eq!(config.backoff_duration(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_retry_config_validation() {
        assert!(RetryConfig::default().validate().is_ok());
        assert!(RetryConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(RetryConfig::default()
            .with_min_interval_ms(5000)
            .with_max_interval_ms(1000)
            .validate()
            .is_err());
    }

    #[test]
    fn test_retry_config_rejects_zero_wait() {
        let config = RetryConfig::default()
            .with_initial_interval_ms(0)
            .with_min_interval_ms(0);
        assert_eq!(config.backoff_duration(3), Duration::ZERO);
        assert!(config.validate().is_err());

        let config = RetryConfig::default().with_min_interval_ms(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sub_second_timeout_is_kept() {
        let config = RetryConfig::new(Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());

        let config = RetryConfig::new(Duration::from_millis(250));
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_from_toml_defaults() {
        let config: RetryConfig = toml::from_str("timeout_seconds = 30").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.min_interval_ms, 500);
    }

    #[test]
    fn test_retry_config_from_toml_millis() {
        let config: RetryConfig = toml::from_str("timeout_ms = 1500").unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(1500));

        let config: RetryConfig =
            toml::from_str("timeout_ms = 750\ntimeout_seconds = 30").unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(750));

        let config: RetryConfig = toml::from_str("min_interval_ms = 200").unwrap();
        assert_eq!(config.timeout(), AWS_CODE_RETRY_TIMEOUT);
        assert_eq!(config.min_interval_ms, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_retries_before_deadline() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let config = RetryConfig::new(Duration::from_millis(800));
        let started = tokio::time::Instant::now();

        let result: std::result::Result<(), _> =
            retry_on_aws_code_with_config(&config, "Throttling", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(aws_error("Throttling")) }
            })
            .await;

        let err = result.unwrap_err().into_operation_error().unwrap();
        assert_eq!(err.code(), Some("Throttling"));
        // attempts at 0 ms and 500 ms; the third would start at 1500 ms
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_millis(800));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_aws_code_logs_operation_label() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = RetryConfig::new(Duration::from_secs(1));
        let result: std::result::Result<(), _> =
            retry_on_aws_code_with_config(&config, "Throttling", || async {
                Err(aws_error("Throttling"))
            })
            .await;
        assert!(result.is_err());

        let output = logs.contents();
        assert!(output.contains("Retry deadline elapsed"));
        assert!(output.contains("aws_code"));
        assert!(output.contains("timeout_ms=1000"));
        assert!(!output.contains("Throttling"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_aws_code_success_after_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_on_aws_code("ThrottlingException", || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(aws_error("ThrottlingException"))
                } else {
                    Ok("canary-created")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "canary-created");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_aws_code_stops_on_other_code() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: std::result::Result<(), _> = retry_on_aws_code("ThrottlingException", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(aws_error("AccessDeniedException")) }
        })
        .await;

        let err = result.unwrap_err().into_operation_error().unwrap();
        assert_eq!(err.code(), Some("AccessDeniedException"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_aws_codes_gives_up_with_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = tokio::time::Instant::now();

        let result: std::result::Result<(), _> =
            retry_on_aws_codes(&["ServiceUnavailable", "Throttling"], || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(aws_error("Throttling")) }
            })
            .await;

        let err = result.unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.into_operation_error().unwrap().code(), Some("Throttling"));
        assert!(calls.load(Ordering::SeqCst) > 1);
        assert!(started.elapsed() >= AWS_CODES_RETRY_TIMEOUT);
        assert!(started.elapsed() < AWS_CODES_RETRY_TIMEOUT + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_timeout_without_completed_attempt() {
        let config = RetryConfig::new(Duration::from_secs(5));

        let result: std::result::Result<(), RetryError<String>> =
            retry_until_timeout(&config, "hang", |_| true, || async {
                sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(RetryError::Timeout(d)) if d == Duration::from_secs(5)));
    }
}
