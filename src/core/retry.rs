use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Configuration for the automatic retry mechanism.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// The maximum number of retries to attempt. The total number of attempts will be `max_retries + 1`.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
    /// Whether a success gives the full retry budget back to the policy.
    pub reset_on_success: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(10),
            reset_on_success: true,
        }
    }
}

impl RetryConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Runs fallible async operations under a [`RetryConfig`].
///
/// The policy counts the retries it has spent. With `reset_on_success` the
/// count drops back to zero after every success, otherwise spent retries stay
/// spent for later calls through the same policy.
#[derive(Debug)]
pub struct RetryPolicy {
    config: RetryConfig,
    spent: AtomicU32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            spent: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Retries still available to the next failure.
    pub fn remaining(&self) -> u32 {
        self.config
            .max_retries
            .saturating_sub(self.spent.load(Ordering::SeqCst))
    }

    /// Call `op` until it succeeds or the retry budget is exhausted.
    ///
    /// The error of the last attempt is returned once no retries are left.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if self.config.reset_on_success {
                        self.spent.store(0, Ordering::SeqCst);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    let spent = self.spent.load(Ordering::SeqCst);
                    if spent >= self.config.max_retries {
                        tracing::warn!(
                            operation,
                            attempt,
                            error = %err,
                            "operation failed, retries exhausted"
                        );
                        return Err(err);
                    }
                    self.spent.store(spent + 1, Ordering::SeqCst);

                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.config.max_attempts(),
                        delay_ms = self.config.delay.as_millis() as u64,
                        error = %err,
                        "operation failed, retrying"
                    );
                    tokio::time::sleep(self.config.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Run `op` under a fresh policy, giving it its own retry budget.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, operation: &str, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryPolicy::new(config.clone()).run(operation, op).await
}
