//! The contract call pipeline.
//!
//! [`ContractPipeline`] drives every stage of a call for one account and
//! folds the result into an [`Outcome`].

use crate::api::{NetworkInfo, RpcClient};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::transaction::{
    decode_operation, AccountCursor, Assembler, EnvelopeBuilder, ErrorCatalog, FinalityPoller,
    InvocationDescriptor, LifetimeRequest, Outcome, PollOptions, Signer, SimulationResult,
    Submitter, TransactionOptions,
};
use soroban_pipeline_types::{AccountId, Hash32, LedgerKey, ScValue, TransactionEnvelope};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    auto_restore: bool,
    timeout_secs: Option<u64>,
    poll: Option<PollOptions>,
    cancel: Option<CancellationToken>,
}

impl InvokeOptions {
    /// Default options: no restore, unbounded validity, configured polling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores archived entries reported by simulation, then retries the call.
    #[must_use]
    pub fn auto_restore(mut self, enabled: bool) -> Self {
        self.auto_restore = enabled;
        self
    }

    /// Closes the envelope's validity window `seconds` after it is built.
    #[must_use]
    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = Some(seconds);
        self
    }

    /// Overrides the configured polling interval and deadline.
    #[must_use]
    pub fn poll(mut self, poll: PollOptions) -> Self {
        self.poll = Some(poll);
        self
    }

    /// Stops waiting for finality when `token` is cancelled.
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Issues contract calls and rent operations for one account.
///
/// Each call refreshes the account's sequence number from the node before
/// building, so consecutive calls never reuse a stale sequence.
///
/// # Example
///
/// ```rust,no_run
/// use soroban_pipeline::{ContractPipeline, PipelineConfig};
/// use soroban_pipeline::transaction::{InvocationDescriptor, LocalKeySigner};
/// use soroban_pipeline::types::{ContractAddress, ScValue};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = PipelineConfig::testnet();
///     let signer = LocalKeySigner::from_hex(&std::env::var("SECRET_KEY")?, config.network_id())?;
///     let pipeline = ContractPipeline::new(config, signer.account(), Arc::new(signer))?;
///
///     let token = ContractAddress::parse(&std::env::var("TOKEN_ID")?)?;
///     let call = InvocationDescriptor::<i128>::invoke(token, "balance", vec![ScValue::symbol("alice")])?;
///     let balance = pipeline.read(&call).await.into_result()?;
///     println!("balance: {balance}");
///     Ok(())
/// }
/// ```
pub struct ContractPipeline {
    config: PipelineConfig,
    client: RpcClient,
    account: AccountId,
    signer: Arc<dyn Signer>,
    catalog: ErrorCatalog,
}

impl fmt::Debug for ContractPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractPipeline")
            .field("config", &self.config)
            .field("account", &self.account)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl ContractPipeline {
    /// Creates a pipeline submitting as `account`, signed by `signer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        config: PipelineConfig,
        account: AccountId,
        signer: Arc<dyn Signer>,
    ) -> PipelineResult<Self> {
        let client = RpcClient::new(&config)?;
        Ok(Self {
            config,
            client,
            account,
            signer,
            catalog: ErrorCatalog::new(),
        })
    }

    /// Sets the catalog used for calls whose descriptor carries none.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ErrorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The node client.
    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// The submitting account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Checks that the node serves the configured network.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on a passphrase mismatch.
    pub async fn verify_network(&self) -> PipelineResult<NetworkInfo> {
        let info = self.client.get_network().await?;
        if info.passphrase != self.config.network_id() {
            return Err(PipelineError::Config(format!(
                "node serves '{}' but the pipeline is configured for '{}'",
                info.passphrase,
                self.config.network_id()
            )));
        }
        Ok(info)
    }

    /// Fetches the current sequence number of `account`.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be loaded.
    pub async fn refresh_cursor(&self, account: AccountId) -> PipelineResult<AccountCursor> {
        let info = self.client.get_account(&account).await?;
        Ok(AccountCursor::new(account, info.sequence()?))
    }

    /// Runs a state-changing call with default options.
    pub async fn invoke<T>(&self, call: &InvocationDescriptor<T>) -> Outcome<T> {
        self.invoke_with(call, &InvokeOptions::default()).await
    }

    /// Runs a state-changing call.
    ///
    /// The signer is never asked to sign an envelope whose simulation failed.
    pub async fn invoke_with<T>(
        &self,
        call: &InvocationDescriptor<T>,
        options: &InvokeOptions,
    ) -> Outcome<T> {
        let catalog = call.catalog().unwrap_or(&self.catalog);
        let outcome = match self.run_invoke(call, catalog, options).await {
            Ok((hash, value)) => Outcome::Success {
                hash: Some(hash),
                value,
            },
            Err(err) => Outcome::from_error(err),
        };
        log_outcome("invoke", &outcome);
        outcome
    }

    /// Simulates a call and decodes its return value without submitting.
    pub async fn read<T>(&self, call: &InvocationDescriptor<T>) -> Outcome<T> {
        let catalog = call.catalog().unwrap_or(&self.catalog);
        let result: PipelineResult<T> = async {
            let (_, simulation) = self
                .simulate(call.serialized_operation(), catalog, &InvokeOptions::default())
                .await?;
            if simulation.needs_restore() {
                return Err(archived_state());
            }
            let value = simulation.return_value().cloned().unwrap_or(ScValue::Void);
            call.decode(&value)
        }
        .await;
        Outcome::from_result(None, result)
    }

    /// Extends the TTL of `key` to `live_until_ledger`.
    pub async fn extend_ttl(&self, key: LedgerKey, live_until_ledger: u32) -> Outcome<()> {
        let request =
            LifetimeRequest::extend_ttl(key, live_until_ledger, self.config.lifetime_resource_fee());
        self.run_lifetime(&request, &InvokeOptions::default()).await
    }

    /// Extends the TTL of `key` to `ledgers` past the latest ledger.
    pub async fn extend_ttl_by(&self, key: LedgerKey, ledgers: u32) -> Outcome<()> {
        match self.client.get_latest_ledger().await {
            Ok(latest) => {
                self.extend_ttl(key, latest.sequence.saturating_add(ledgers))
                    .await
            }
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Restores an archived `key`.
    pub async fn restore(&self, key: LedgerKey) -> Outcome<()> {
        let request = LifetimeRequest::restore(key, self.config.lifetime_resource_fee());
        self.run_lifetime(&request, &InvokeOptions::default()).await
    }

    fn envelope_builder(&self, options: &InvokeOptions) -> EnvelopeBuilder {
        let mut tx_options =
            TransactionOptions::new(self.config.network_id()).fee(self.config.base_fee());
        if let Some(seconds) = options.timeout_secs {
            tx_options = tx_options.timeout(seconds);
        }
        EnvelopeBuilder::new(tx_options)
    }

    fn assembler(&self) -> Assembler {
        Assembler::new().with_margin(self.config.resource_fee_margin())
    }

    async fn simulate(
        &self,
        serialized_operation: &str,
        catalog: &ErrorCatalog,
        options: &InvokeOptions,
    ) -> PipelineResult<(TransactionEnvelope, SimulationResult)> {
        let operation = decode_operation(serialized_operation)?;
        let mut cursor = self.refresh_cursor(self.account).await?;
        let unsigned = self
            .envelope_builder(options)
            .build_operation(&mut cursor, operation)?;
        let response = self
            .client
            .simulate_transaction(&unsigned.to_base64()?)
            .await?;
        let simulation = SimulationResult::from_response(response, catalog)?;
        Ok((unsigned, simulation))
    }

    async fn run_invoke<T>(
        &self,
        call: &InvocationDescriptor<T>,
        catalog: &ErrorCatalog,
        options: &InvokeOptions,
    ) -> PipelineResult<(Hash32, T)> {
        let (mut unsigned, mut simulation) = self
            .simulate(call.serialized_operation(), catalog, options)
            .await?;

        if let Some(preamble) = simulation.restore_preamble().cloned() {
            if !options.auto_restore {
                return Err(archived_state());
            }
            let request = LifetimeRequest::from_preamble(&preamble)?;
            info!(keys = request.footprint().key_count(), "Restoring archived entries");
            self.submit_lifetime(&request, catalog, options).await?;

            (unsigned, simulation) = self
                .simulate(call.serialized_operation(), catalog, options)
                .await?;
            if simulation.needs_restore() {
                return Err(archived_state());
            }
        }

        let assembled = self.assembler().assemble(
            &unsigned,
            simulation.footprint(),
            simulation.min_resource_fee(),
        )?;
        let hash = self.sign_and_submit(&assembled, catalog).await?;
        let value = self
            .poller(options)
            .wait(hash, |value| call.decode(value), catalog)
            .await?;
        Ok((hash, value))
    }

    async fn run_lifetime(&self, request: &LifetimeRequest, options: &InvokeOptions) -> Outcome<()> {
        let outcome = match self.submit_lifetime(request, &self.catalog, options).await {
            Ok(hash) => Outcome::Success {
                hash: Some(hash),
                value: (),
            },
            Err(err) => Outcome::from_error(err),
        };
        log_outcome(request.operation().name(), &outcome);
        outcome
    }

    async fn submit_lifetime(
        &self,
        request: &LifetimeRequest,
        catalog: &ErrorCatalog,
        options: &InvokeOptions,
    ) -> PipelineResult<Hash32> {
        let mut cursor = self.refresh_cursor(self.account).await?;
        let envelope =
            request.envelope(&self.envelope_builder(options), &self.assembler(), &mut cursor)?;
        let hash = self.sign_and_submit(&envelope, catalog).await?;
        self.poller(options).wait(hash, |_| Ok(()), catalog).await?;
        info!(tx_hash = %hash, operation = request.operation().name(), "Lifetime operation applied");
        Ok(hash)
    }

    async fn sign_and_submit(
        &self,
        envelope: &TransactionEnvelope,
        catalog: &ErrorCatalog,
    ) -> PipelineResult<Hash32> {
        let signed = self
            .signer
            .sign_envelope(&envelope.to_base64()?)
            .await
            .map_err(|err| match err {
                PipelineError::SignerDeclined(_) => err,
                other => PipelineError::SignerDeclined(other.to_string()),
            })?;
        Submitter::new(self.client.clone(), self.config.submit_retry().clone())
            .submit(&signed, catalog)
            .await
    }

    fn poller(&self, options: &InvokeOptions) -> FinalityPoller {
        let poll = options.poll.unwrap_or_else(|| {
            PollOptions::new(self.config.poll_interval(), self.config.poll_timeout())
        });
        let poller = FinalityPoller::new(self.client.clone(), poll);
        match &options.cancel {
            Some(token) => poller.with_cancellation(token.clone()),
            None => poller,
        }
    }
}

fn archived_state() -> PipelineError {
    PipelineError::simulation("footprint contains archived entries; restore them first")
}

fn log_outcome<T>(operation: &str, outcome: &Outcome<T>) {
    match outcome {
        Outcome::Success { hash, .. } => {
            info!(operation, tx_hash = ?hash, "Call succeeded");
        }
        Outcome::Failed(err) => {
            warn!(operation, kind = ?err.kind(), error = %err.sanitized_message(), "Call failed");
        }
        Outcome::Unknown { hash } => {
            warn!(operation, tx_hash = %hash, "Call outcome unknown; re-poll before resubmitting");
        }
    }
}
