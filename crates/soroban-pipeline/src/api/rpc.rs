//! JSON-RPC client for the contract node.

use crate::api::response::{
    AccountInfo, GetTransactionResponse, LatestLedger, NetworkInfo, RpcRequest, RpcResponse,
    SendResponse, SimulateResponse,
};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::retry::{RetryConfig, RetryExecutor};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use soroban_pipeline_types::{AccountId, Hash32};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";
const JSONRPC_VERSION: &str = "2.0";

/// Client for the node's JSON-RPC endpoint.
///
/// Every call is retried on transient transport failures (connection errors,
/// timeouts, 429 and 5xx) according to [`PipelineConfig::with_retry`]. Node
/// statuses inside a successful response are returned as-is and never retried
/// here.
///
/// # Example
///
/// ```rust,no_run
/// use soroban_pipeline::api::RpcClient;
/// use soroban_pipeline::PipelineConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = RpcClient::new(&PipelineConfig::testnet())?;
///     let ledger = client.get_latest_ledger().await?;
///     println!("Latest ledger: {}", ledger.sequence);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: Url,
    client: Client,
    retry_config: Arc<RetryConfig>,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build (e.g., invalid TLS configuration).
    pub fn new(config: &PipelineConfig) -> PipelineResult<Self> {
        let pool = config.pool_config();

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);

        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build().map_err(PipelineError::Http)?;

        Ok(Self {
            url: config.rpc_url().clone(),
            client,
            retry_config: Arc::new(config.retry_config().clone()),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Returns the endpoint URL.
    pub fn rpc_url(&self) -> &Url {
        &self.url
    }

    /// Returns the transport retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Gets the network passphrase and protocol version of the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node answers with an error.
    pub async fn get_network(&self) -> PipelineResult<NetworkInfo> {
        self.call("getNetwork", None).await
    }

    /// Gets the latest ledger known to the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node answers with an error.
    pub async fn get_latest_ledger(&self) -> PipelineResult<LatestLedger> {
        self.call("getLatestLedger", None).await
    }

    /// Gets an account and its current sequence number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node does not know the account.
    pub async fn get_account(&self, account: &AccountId) -> PipelineResult<AccountInfo> {
        self.call("getAccount", Some(json!({ "account": account.to_string() })))
            .await
    }

    /// Dry-runs an unsigned envelope.
    ///
    /// A failing simulation is a successful call: the failure is reported in
    /// [`SimulateResponse::error`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node answers with an error.
    pub async fn simulate_transaction(&self, envelope_b64: &str) -> PipelineResult<SimulateResponse> {
        self.call(
            "simulateTransaction",
            Some(json!({ "transaction": envelope_b64 })),
        )
        .await
    }

    /// Submits a signed envelope once.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node answers with an error.
    pub async fn send_transaction(&self, envelope_b64: &str) -> PipelineResult<SendResponse> {
        self.call(
            "sendTransaction",
            Some(json!({ "transaction": envelope_b64 })),
        )
        .await
    }

    /// Gets the status of a transaction by hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node answers with an error.
    pub async fn get_transaction(&self, hash: &Hash32) -> PipelineResult<GetTransactionResponse> {
        self.call("getTransaction", Some(json!({ "hash": hash.to_hex() })))
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Option<serde_json::Value>,
    ) -> PipelineResult<T> {
        let client = self.client.clone();
        let url = self.url.clone();
        let next_id = self.next_id.clone();

        let executor = RetryExecutor::new((*self.retry_config).clone());
        executor
            .execute(|| {
                let client = client.clone();
                let url = url.clone();
                let request = RpcRequest {
                    jsonrpc: JSONRPC_VERSION,
                    id: next_id.fetch_add(1, Ordering::Relaxed),
                    method,
                    params: params.clone(),
                };
                let body = serde_json::to_value(&request);
                async move {
                    trace!(method, "RPC request");
                    let response = client
                        .post(url)
                        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                        .header(ACCEPT, JSON_CONTENT_TYPE)
                        .json(&body?)
                        .send()
                        .await?;

                    Self::handle_response_static(method, response).await
                }
            })
            .await
    }

    async fn handle_response_static<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> PipelineResult<T> {
        let status = response.status();

        if status.is_success() {
            let body: RpcResponse<T> = response.json().await?;
            if let Some(error) = body.error {
                return Err(PipelineError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            body.result
                .ok_or_else(|| PipelineError::Internal(format!("{method} returned no result")))
        } else {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .or_else(|| body.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error")
                .to_string();

            Err(PipelineError::api(status.as_u16(), message))
        }
    }
}
