//! Finality polling.

use crate::api::response::TxStatus;
use crate::api::RpcClient;
use crate::error::{PipelineError, PipelineResult};
use crate::transaction::classify::{classify_execution, ErrorCatalog};
use soroban_pipeline_types::{Hash32, ScValue};
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default deadline for a transaction to reach a final status.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between two queries.
    pub interval: Duration,
    /// Total time to wait for a final status.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollOptions {
    /// Creates options.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Waits for a submitted transaction to reach a final status.
#[derive(Debug, Clone)]
pub struct FinalityPoller {
    client: RpcClient,
    options: PollOptions,
    cancel: Option<CancellationToken>,
}

impl FinalityPoller {
    /// Creates a poller.
    pub fn new(client: RpcClient, options: PollOptions) -> Self {
        Self {
            client,
            options,
            cancel: None,
        }
    }

    /// Stops polling early when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The polling options.
    pub fn options(&self) -> PollOptions {
        self.options
    }

    /// Polls until the transaction succeeds, fails, or the deadline passes.
    ///
    /// On success the raw return value is handed to `decode`; a transaction
    /// that returned nothing decodes [`ScValue::Void`]. A status query that
    /// fails in transport is logged and repeated, since the transaction may
    /// still finalize. The deadline and the cancellation token also cut short
    /// a query that is still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExecutionFailed`] for a failed transaction,
    /// [`PipelineError::Timeout`] (carrying `hash`) when the deadline passes or
    /// the token is cancelled, and decoding errors for a successful result the
    /// caller cannot decode.
    pub async fn wait<T, D>(
        &self,
        hash: Hash32,
        decode: D,
        catalog: &ErrorCatalog,
    ) -> PipelineResult<T>
    where
        D: Fn(&ScValue) -> PipelineResult<T>,
    {
        let started = Instant::now();
        let deadline = started + self.options.timeout;
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let queried = tokio::select! {
                biased;
                _ = cancelled(self.cancel.as_ref()) => return Err(self.timed_out(hash, started)),
                _ = sleep_until(deadline) => return Err(self.timed_out(hash, started)),
                queried = self.client.get_transaction(&hash) => queried,
            };

            match queried {
                Ok(response) => match response.status {
                    TxStatus::Success => {
                        let value = response.return_value()?.unwrap_or(ScValue::Void);
                        info!(tx_hash = %hash, ledger = response.ledger, polls, "Transaction succeeded");
                        return decode(&value);
                    }
                    TxStatus::Failed => {
                        let err =
                            classify_execution(hash, response.result_error.as_deref(), catalog);
                        warn!(tx_hash = %hash, ledger = response.ledger, error = %err, "Transaction failed");
                        return Err(err);
                    }
                    TxStatus::NotFound => {
                        debug!(tx_hash = %hash, polls, "Transaction not found yet");
                    }
                },
                Err(err) => {
                    warn!(
                        tx_hash = %hash,
                        polls,
                        error = %err.sanitized_message(),
                        "Status query failed, polling again"
                    );
                }
            }

            if Instant::now() + self.options.interval > deadline {
                return Err(self.timed_out(hash, started));
            }

            tokio::select! {
                biased;
                _ = cancelled(self.cancel.as_ref()) => return Err(self.timed_out(hash, started)),
                _ = sleep(self.options.interval) => {}
            }
        }
    }

    fn timed_out(&self, hash: Hash32, started: Instant) -> PipelineError {
        let waited = started.elapsed();
        warn!(tx_hash = %hash, waited_ms = waited.as_millis() as u64, "Gave up waiting for transaction");
        PipelineError::Timeout { hash, waited }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
