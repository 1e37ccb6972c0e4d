//! Resilience patterns for service clients
//!
//! - Retry with exponential backoff
//! - Per-attempt timeout
//! - `Resilience`, the facade composing both

mod retry;

pub use retry::{RetryConfig, RetryExecutor};

use std::future::Future;
use std::time::Duration;

use crate::error::{ErrorContext, Result, ServiceError};

/// Bounds every attempt by a timeout and retries transient failures.
#[derive(Debug, Clone)]
pub struct Resilience {
    retry: RetryExecutor,
    attempt_timeout: Duration,
}

impl Default for Resilience {
    fn default() -> Self {
        Self::new(RetryConfig::default(), Duration::from_secs(5))
    }
}

impl Resilience {
    pub fn new(retry_config: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            retry: RetryExecutor::new(retry_config),
            attempt_timeout,
        }
    }

    /// Execute a fallible operation with all configured resilience patterns.
    ///
    /// A failure that survives every attempt is returned with the service
    /// name and attempt count attached.
    pub async fn execute<F, Fut, T>(&self, service: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let limit = self.attempt_timeout;
        let mut attempts = 0u32;

        let result = self
            .retry
            .execute(|| {
                attempts += 1;
                let attempt = operation();
                async move {
                    match tokio::time::timeout(limit, attempt).await {
                        Ok(result) => result,
                        Err(_) => Err(ServiceError::timeout(format!("no response within {:?}", limit))),
                    }
                }
            })
            .await;

        result.map_err(|err| err.with_context(ErrorContext::for_service(service).attempts(attempts)))
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }
}
