//! Bounded retry with backoff.
//!
//! One policy type serves two loops: the transport layer retries failed
//! HTTP exchanges with exponential backoff, and the submitter retries the
//! node's "try again later" answer on a fixed interval within a wall-clock
//! budget.
//!
//! # Example
//!
//! ```rust
//! use soroban_pipeline::retry::RetryConfig;
//!
//! let config = RetryConfig::builder()
//!     .max_retries(5)
//!     .initial_delay_ms(100)
//!     .max_delay_ms(10_000)
//!     .exponential_base(2.0)
//!     .jitter(true)
//!     .build();
//! assert_eq!(config.max_retries, 5);
//! ```

use crate::error::{PipelineError, PipelineResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay before the first retry (in milliseconds).
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// Base for exponential backoff (1.0 gives a fixed interval).
    pub exponential_base: f64,
    /// Whether to add random jitter to delays.
    pub jitter: bool,
    /// Jitter factor (0.0 to 1.0) - how much randomness to add.
    pub jitter_factor: f64,
    /// Wall-clock budget for all attempts (in milliseconds), if any.
    ///
    /// A retry whose delay would end past the budget is not attempted.
    pub max_elapsed_ms: Option<u64>,
    /// HTTP status codes that should trigger a retry.
    pub retryable_status_codes: Vec<u16>,
}

/// HTTP status codes treated as transient unless a policy overrides them.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [
    408, // Request Timeout
    429, // Too Many Requests
    500, // Internal Server Error
    502, // Bad Gateway
    503, // Service Unavailable
    504, // Gateway Timeout
];

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            exponential_base: 2.0,
            jitter: true,
            jitter_factor: 0.5,
            max_elapsed_ms: None,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryConfig {
    /// Creates a new builder for RetryConfig.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Creates a config with no retries (fail fast).
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Creates a config optimized for aggressive retrying.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 50,
            max_delay_ms: 5_000,
            exponential_base: 1.5,
            jitter: true,
            jitter_factor: 0.3,
            ..Default::default()
        }
    }

    /// Creates a config optimized for conservative retrying.
    pub fn conservative() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            exponential_base: 2.0,
            jitter: true,
            jitter_factor: 0.5,
            ..Default::default()
        }
    }

    /// The submission policy: a fixed 4 second interval, no jitter, and a
    /// 20 second budget for the whole exchange.
    pub fn submission() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 4_000,
            max_delay_ms: 4_000,
            exponential_base: 1.0,
            jitter: false,
            jitter_factor: 0.0,
            max_elapsed_ms: Some(20_000),
            ..Default::default()
        }
    }

    /// Calculates the delay for a given attempt number.
    #[allow(clippy::cast_possible_truncation)] // Delay is bounded by max_delay_ms
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }

        let base_delay = self.initial_delay_ms as f64
            * self.exponential_base.powi(attempt.saturating_sub(1) as i32);

        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::random::<f64>() * jitter_range * 2.0 - jitter_range;
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Returns true if waiting until `elapsed` would overrun the budget.
    pub fn exceeds_budget(&self, elapsed: Duration) -> bool {
        self.max_elapsed_ms
            .is_some_and(|budget| elapsed > Duration::from_millis(budget))
    }

    /// Checks if a status code should trigger a retry.
    pub fn is_retryable_status(&self, status_code: u16) -> bool {
        self.retryable_status_codes.contains(&status_code)
    }

    /// Checks if an error should trigger a transport retry.
    ///
    /// Status codes come from this policy; everything else follows
    /// [`PipelineError::is_retryable`].
    pub fn is_retryable_error(&self, error: &PipelineError) -> bool {
        match error {
            PipelineError::Api { status_code, .. } => self.is_retryable_status(*status_code),
            other => other.is_retryable(),
        }
    }
}

/// Builder for RetryConfig.
#[derive(Debug, Clone, Default)]
pub struct RetryConfigBuilder {
    max_retries: Option<u32>,
    initial_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    exponential_base: Option<f64>,
    jitter: Option<bool>,
    jitter_factor: Option<f64>,
    max_elapsed_ms: Option<u64>,
    retryable_status_codes: Option<Vec<u16>>,
}

impl RetryConfigBuilder {
    /// Sets the maximum number of retry attempts.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the initial delay before the first retry (in milliseconds).
    pub fn initial_delay_ms(mut self, initial_delay_ms: u64) -> Self {
        self.initial_delay_ms = Some(initial_delay_ms);
        self
    }

    /// Sets the maximum delay between retries (in milliseconds).
    pub fn max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = Some(max_delay_ms);
        self
    }

    /// Sets the base for exponential backoff.
    pub fn exponential_base(mut self, base: f64) -> Self {
        self.exponential_base = Some(base);
        self
    }

    /// Uses the same delay between every attempt, without jitter.
    pub fn fixed_interval_ms(mut self, interval_ms: u64) -> Self {
        self.initial_delay_ms = Some(interval_ms);
        self.max_delay_ms = Some(interval_ms);
        self.exponential_base = Some(1.0);
        self.jitter = Some(false);
        self
    }

    /// Enables or disables jitter.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Sets the jitter factor (0.0 to 1.0).
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = Some(factor.clamp(0.0, 1.0));
        self
    }

    /// Sets the wall-clock budget for all attempts (in milliseconds).
    pub fn max_elapsed_ms(mut self, max_elapsed_ms: u64) -> Self {
        self.max_elapsed_ms = Some(max_elapsed_ms);
        self
    }

    /// Sets the HTTP status codes that should trigger a retry.
    pub fn retryable_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retryable_status_codes = Some(codes);
        self
    }

    /// Builds the RetryConfig.
    pub fn build(self) -> RetryConfig {
        let default = RetryConfig::default();
        RetryConfig {
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            initial_delay_ms: self.initial_delay_ms.unwrap_or(default.initial_delay_ms),
            max_delay_ms: self.max_delay_ms.unwrap_or(default.max_delay_ms),
            exponential_base: self.exponential_base.unwrap_or(default.exponential_base),
            jitter: self.jitter.unwrap_or(default.jitter),
            jitter_factor: self.jitter_factor.unwrap_or(default.jitter_factor),
            max_elapsed_ms: self.max_elapsed_ms.or(default.max_elapsed_ms),
            retryable_status_codes: self
                .retryable_status_codes
                .unwrap_or(default.retryable_status_codes),
        }
    }
}

/// Executes an async operation with automatic retry.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor with the given config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the policy this executor applies.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Executes an async operation, retrying retryable transport errors.
    ///
    /// # Errors
    ///
    /// Returns the last error once it is not retryable or the policy is exhausted.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> PipelineResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = PipelineResult<T>>,
    {
        self.execute_with_predicate(operation, |error| self.config.is_retryable_error(error))
            .await
    }

    /// Executes an async operation, retrying every error the predicate selects.
    ///
    /// # Errors
    ///
    /// Returns the last error once the predicate rejects it, the attempt limit
    /// is reached, or the next delay would overrun the elapsed budget.
    pub async fn execute_with_predicate<F, Fut, T, P>(
        &self,
        operation: F,
        should_retry: P,
    ) -> PipelineResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = PipelineResult<T>>,
        P: Fn(&PipelineError) -> bool,
    {
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.config.max_retries || !should_retry(&error) {
                        return Err(error);
                    }

                    attempt += 1;
                    let delay = self.config.delay_for_attempt(attempt);
                    if self.config.exceeds_budget(started.elapsed() + delay) {
                        debug!(attempt, "Retry budget exhausted");
                        return Err(error);
                    }

                    debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "Retrying");
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 100);
        assert!(config.jitter);
        assert!(config.max_elapsed_ms.is_none());
    }

    #[test]
    fn test_no_retry_config() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_submission_preset() {
        let config = RetryConfig::submission();
        assert!(!config.jitter);
        assert_eq!(config.max_elapsed_ms, Some(20_000));
        for attempt in 1..=5 {
            assert_eq!(config.delay_for_attempt(attempt), Duration::from_secs(4));
        }
        assert!(!config.exceeds_budget(Duration::from_secs(20)));
        assert!(config.exceeds_budget(Duration::from_millis(20_001)));
    }

    #[test]
    fn test_builder() {
        let config = RetryConfig::builder()
            .max_retries(5)
            .initial_delay_ms(200)
            .max_delay_ms(5000)
            .exponential_base(1.5)
            .jitter(false)
            .max_elapsed_ms(9_000)
            .build();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_delay_ms, 200);
        assert_eq!(config.max_delay_ms, 5000);
        assert!((config.exponential_base - 1.5).abs() < f64::EPSILON);
        assert!(!config.jitter);
        assert_eq!(config.max_elapsed_ms, Some(9_000));
    }

    #[test]
    fn test_fixed_interval() {
        let config = RetryConfig::builder().fixed_interval_ms(250).build();
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(250));
        assert_eq!(config.delay_for_attempt(7), Duration::from_millis(250));
    }

    #[test]
    fn test_delay_calculation_no_jitter() {
        let config = RetryConfig::builder()
            .initial_delay_ms(100)
            .exponential_base(2.0)
            .jitter(false)
            .build();

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(0));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let config = RetryConfig::builder()
            .initial_delay_ms(1000)
            .max_delay_ms(2000)
            .exponential_base(2.0)
            .jitter(false)
            .build();

        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_retryable_errors() {
        let config = RetryConfig::default();
        assert!(config.is_retryable_error(&PipelineError::api(503, "Service Unavailable")));
        assert!(config.is_retryable_error(&PipelineError::api(429, "Too Many Requests")));
        assert!(!config.is_retryable_error(&PipelineError::api(400, "Bad Request")));
        assert!(!config.is_retryable_error(&PipelineError::simulation("trap")));

        let strict = RetryConfig::builder()
            .retryable_status_codes(vec![503])
            .build();
        assert!(strict.is_retryable_error(&PipelineError::api(503, "Service Unavailable")));
        assert!(!strict.is_retryable_error(&PipelineError::api(429, "Too Many Requests")));
    }

    #[test]
    fn test_default_policy_agrees_with_error() {
        let config = RetryConfig::default();
        for code in [400, 404, 408, 409, 429, 500, 501, 502, 503, 504] {
            let err = PipelineError::api(code, "status");
            assert_eq!(config.is_retryable_error(&err), err.is_retryable(), "status {code}");
        }
        let rpc = PipelineError::Rpc {
            code: -32603,
            message: "internal".into(),
        };
        assert_eq!(config.is_retryable_error(&rpc), rpc.is_retryable());
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let config = RetryConfig::builder()
            .max_retries(3)
            .initial_delay_ms(1)
            .jitter(false)
            .build();
        let executor = RetryExecutor::new(config);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = executor
            .execute(|| {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(PipelineError::api(503, "Service Unavailable"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let config = RetryConfig::builder()
            .max_retries(2)
            .initial_delay_ms(1)
            .jitter(false)
            .build();
        let executor = RetryExecutor::new(config);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = executor
            .execute(|| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(PipelineError::api(503, "Always fails"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_non_retryable_error() {
        let executor = RetryExecutor::new(RetryConfig::builder().initial_delay_ms(1).build());
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = executor
            .execute(|| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, _>(PipelineError::api(400, "Bad Request"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_elapsed_budget_stops_retries() {
        let config = RetryConfig::builder()
            .max_retries(100)
            .fixed_interval_ms(20)
            .max_elapsed_ms(50)
            .build();
        let executor = RetryExecutor::new(config);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = executor
            .execute_with_predicate(
                || {
                    let counter = counter_clone.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<i32, _>(PipelineError::Internal("again".into()))
                    }
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        let attempts = counter.load(Ordering::SeqCst);
        assert!((2..=3).contains(&attempts), "attempts = {attempts}");
    }
}
