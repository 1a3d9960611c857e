//! Submission with try-again retry.

use crate::api::response::SendStatus;
use crate::api::RpcClient;
use crate::error::PipelineResult;
use crate::retry::{RetryConfig, RetryExecutor};
use crate::transaction::classify::{classify_submission, ErrorCatalog};
use soroban_pipeline_types::Hash32;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

/// Sends signed envelopes to the node.
///
/// `TRY_AGAIN_LATER` is retried under the submission [`RetryConfig`]; every
/// other refusal fails at once. `DUPLICATE` means the node already holds the
/// envelope and is accepted like `PENDING`.
#[derive(Debug, Clone)]
pub struct Submitter {
    client: RpcClient,
    retry: RetryConfig,
}

impl Submitter {
    /// Creates a submitter.
    pub fn new(client: RpcClient, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// The try-again policy.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Submits a signed envelope and returns its hash.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SubmissionRejected`] when the node refuses the
    /// envelope or keeps asking to try again past the retry budget, and a
    /// transport error when the node cannot be reached.
    ///
    /// [`PipelineError::SubmissionRejected`]: crate::PipelineError::SubmissionRejected
    pub async fn submit(&self, envelope_b64: &str, catalog: &ErrorCatalog) -> PipelineResult<Hash32> {
        let attempts = AtomicU32::new(0);
        let executor = RetryExecutor::new(self.retry.clone());
        let counter = &attempts;
        let client = &self.client;

        let hash = executor
            .execute_with_predicate(
                move || async move {
                    let attempt = counter.fetch_add(1, Ordering::Relaxed) + 1;
                    let response = client.send_transaction(envelope_b64).await?;
                    debug!(attempt, status = %response.status, "Submission attempt");
                    match response.status {
                        SendStatus::Pending | SendStatus::Duplicate => response.hash(),
                        SendStatus::TryAgainLater => {
                            warn!(attempt, tx_hash = %response.hash, "Node asked to try again later");
                            Err(classify_submission(&response, catalog))
                        }
                        SendStatus::Error => Err(classify_submission(&response, catalog)),
                    }
                },
                |error| error.is_try_again(),
            )
            .await?;

        info!(
            tx_hash = %hash,
            attempts = attempts.load(Ordering::Relaxed),
            "Transaction submitted"
        );
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RpcClient {
        let config = PipelineConfig::custom(&server.uri(), "Test Network")
            .unwrap()
            .without_retry();
        RpcClient::new(&config).unwrap()
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig::builder()
            .max_retries(5)
            .fixed_interval_ms(10)
            .jitter(false)
            .build()
    }

    fn send_result(status: &str) -> serde_json::Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "status": status, "hash": "cd".repeat(32), "latestLedger": 10 }
        })
    }

    #[tokio::test]
    async fn test_duplicate_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "sendTransaction" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(send_result("DUPLICATE")))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = Submitter::new(client(&server), fast_retry());
        let hash = submitter.submit("AAAA", &ErrorCatalog::new()).await.unwrap();
        assert_eq!(hash.to_hex(), "cd".repeat(32));
    }

    #[tokio::test]
    async fn test_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "status": "ERROR",
                    "hash": "cd".repeat(32),
                    "errorResult": "txBadSeq"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let submitter = Submitter::new(client(&server), fast_retry());
        let err = submitter.submit("AAAA", &ErrorCatalog::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SubmissionRejected);
        assert!(err.to_string().contains("txBadSeq"));
    }

    #[tokio::test]
    async fn test_try_again_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(send_result("TRY_AGAIN_LATER")))
            .expect(3)
            .mount(&server)
            .await;

        let retry = RetryConfig::builder()
            .max_retries(2)
            .fixed_interval_ms(10)
            .jitter(false)
            .build();
        let submitter = Submitter::new(client(&server), retry);
        let err = submitter.submit("AAAA", &ErrorCatalog::new()).await.unwrap_err();
        assert!(err.is_try_again());
    }
}
