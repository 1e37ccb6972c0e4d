//! Retry with exponential backoff for recoverable errors
//!
//! The executor is generic over the error type: anything implementing
//! `Retryable` decides for itself whether another attempt makes sense.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};

use crate::error::Retryable;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means a single attempt)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_interval: Duration,

    /// Maximum backoff duration
    pub max_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Jitter applied to each interval, 0.0 for none
    pub randomization_factor: f64,

    /// Maximum total time to spend retrying
    pub max_elapsed_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            randomization_factor: 0.2,
            max_elapsed_time: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryConfig {
    /// Fixed pause between attempts, no jitter.
    pub fn fixed(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            randomization_factor: 0.0,
            max_elapsed_time: None,
        }
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig {{ max_retries: {}, initial_interval: {:?}, max_interval: {:?}, multiplier: {}, randomization_factor: {} }}",
            self.max_retries,
            self.initial_interval,
            self.max_interval,
            self.multiplier,
            self.randomization_factor,
        )
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute a fallible operation, retrying retryable errors according to the configuration
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            multiplier: self.config.multiplier,
            randomization_factor: self.config.randomization_factor,
            max_elapsed_time: self.config.max_elapsed_time,
            ..ExponentialBackoff::default()
        };
        backoff.reset();

        let mut retries = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.config.max_retries => {
                    match backoff.next_backoff() {
                        Some(pause) => {
                            log::warn!(
                                "Operation failed with retryable error, retrying in {:?} (attempt {}/{}): {}",
                                pause,
                                retries + 2,
                                self.config.max_attempts(),
                                err
                            );
                            tokio::time::sleep(pause).await;
                            retries += 1;
                        }
                        None => {
                            log::warn!("Retry budget elapsed after {} attempts: {}", retries + 1, err);
                            return Err(err);
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick(max_retries: u32) -> RetryExecutor {
        RetryExecutor::new(RetryConfig::fixed(max_retries, Duration::from_millis(5)))
    }

    #[tokio::test]
    async fn test_successful_operation() {
        let retry = quick(2);
        let result = retry.execute(|| async move { Ok::<_, ServiceError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_on_failure() {
        let attempts = &AtomicUsize::new(0);

        let result = quick(2)
            .execute(|| async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::network("Test failure"))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_non_retryable_error() {
        let attempts = &AtomicUsize::new(0);

        let result: Result<(), _> = quick(3)
            .execute(|| async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::validation("Invalid input"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_max_retries_exceeded() {
        let attempts = &AtomicUsize::new(0);

        let result: Result<(), _> = quick(2)
            .execute(|| async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::server(503, "Persistent failure"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[derive(Debug)]
    struct Flaky(bool);

    impl fmt::Display for Flaky {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "flaky({})", self.0)
        }
    }

    impl Retryable for Flaky {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn test_custom_error_type() {
        let attempts = &AtomicUsize::new(0);

        let result: Result<(), Flaky> = quick(1)
            .execute(|| async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Flaky(true))
            })
            .await;

        assert!(matches!(result, Err(Flaky(true))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
