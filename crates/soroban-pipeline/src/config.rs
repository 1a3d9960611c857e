//! Network configuration for the pipeline.
//!
//! A [`PipelineConfig`] names the RPC endpoint, the network passphrase that
//! scopes transaction hashes and signatures, and the policies of every stage:
//! transport retry, submission retry, polling cadence and fee settings.

use crate::error::{PipelineError, PipelineResult};
use crate::retry::RetryConfig;
use std::time::Duration;
use url::Url;

/// Environment variable holding the RPC endpoint.
pub const ENV_RPC_URL: &str = "SOROBAN_RPC_URL";
/// Environment variable holding the network passphrase.
pub const ENV_NETWORK_PASSPHRASE: &str = "SOROBAN_NETWORK_PASSPHRASE";
/// Environment variable holding the base fee.
pub const ENV_BASE_FEE: &str = "SOROBAN_BASE_FEE";

/// Default base fee per operation, in the smallest fee unit.
pub const DEFAULT_BASE_FEE: u64 = 100;

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections per host.
    /// Default: unlimited (no limit)
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    /// Default: 90 seconds
    pub idle_timeout: Duration,
    /// TCP keepalive interval, if enabled.
    /// Default: 60 seconds
    pub tcp_keepalive: Option<Duration>,
    /// Whether to enable TCP nodelay (disable Nagle's algorithm).
    /// Default: true
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Creates a configuration optimized for low-latency scenarios.
    pub fn low_latency() -> Self {
        Self {
            max_idle_per_host: Some(8),
            idle_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(15)),
            tcp_nodelay: true,
        }
    }
}

/// Known networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// The public network
    Mainnet,
    /// The public test network
    Testnet,
    /// The preview network for upcoming protocol versions
    Futurenet,
    /// A standalone node on the local machine
    Local,
    /// Any other network
    Custom,
}

impl Network {
    /// Returns the passphrase of a well-known network.
    pub fn passphrase(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("Public Global Stellar Network ; September 2015"),
            Network::Testnet => Some("Test SDF Network ; September 2015"),
            Network::Futurenet => Some("Test SDF Future Network ; October 2022"),
            Network::Local => Some("Standalone Network ; February 2017"),
            Network::Custom => None,
        }
    }

    /// Returns the network name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Futurenet => "futurenet",
            Network::Local => "local",
            Network::Custom => "custom",
        }
    }

    fn from_passphrase(passphrase: &str) -> Self {
        [
            Network::Mainnet,
            Network::Testnet,
            Network::Futurenet,
            Network::Local,
        ]
        .into_iter()
        .find(|network| network.passphrase() == Some(passphrase))
        .unwrap_or(Network::Custom)
    }
}

/// Configuration for the pipeline.
///
/// # Example
///
/// ```rust
/// use soroban_pipeline::PipelineConfig;
/// use soroban_pipeline::retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::testnet()
///     .with_timeout(Duration::from_secs(10))
///     .with_retry(RetryConfig::aggressive())
///     .with_poll_timeout(Duration::from_secs(60));
/// assert_eq!(config.network_id(), "Test SDF Network ; September 2015");
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub(crate) network: Network,
    pub(crate) rpc_url: Url,
    pub(crate) network_id: String,
    pub(crate) timeout: Duration,
    pub(crate) retry_config: RetryConfig,
    pub(crate) submit_retry: RetryConfig,
    pub(crate) pool_config: PoolConfig,
    pub(crate) base_fee: u64,
    pub(crate) poll_interval: Duration,
    pub(crate) poll_timeout: Duration,
    pub(crate) resource_fee_margin_pct: u32,
    pub(crate) lifetime_resource_fee: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

impl PipelineConfig {
    fn preset(network: Network, rpc_url: Url, network_id: String) -> Self {
        Self {
            network,
            rpc_url,
            network_id,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            submit_retry: RetryConfig::submission(),
            pool_config: PoolConfig::default(),
            base_fee: DEFAULT_BASE_FEE,
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(30),
            resource_fee_margin_pct: 0,
            lifetime_resource_fee: 1_000_000,
        }
    }

    fn well_known(network: Network, rpc_url: &'static str) -> Self {
        let url = Url::parse(rpc_url).expect("valid RPC URL");
        let network_id = network.passphrase().unwrap_or_default().to_string();
        Self::preset(network, url, network_id)
    }

    /// Creates a configuration for the public test network.
    pub fn testnet() -> Self {
        Self::well_known(Network::Testnet, "https://soroban-testnet.stellar.org")
    }

    /// Creates a configuration for the preview network.
    pub fn futurenet() -> Self {
        Self::well_known(Network::Futurenet, "https://rpc-futurenet.stellar.org")
    }

    /// Creates a configuration for a standalone node on the default port.
    pub fn local() -> Self {
        let mut config = Self::well_known(Network::Local, "http://localhost:8000/soroban/rpc");
        config.timeout = Duration::from_secs(10);
        config.retry_config = RetryConfig::aggressive();
        config.pool_config = PoolConfig::low_latency();
        config
    }

    /// Creates a configuration for any endpoint and network passphrase.
    ///
    /// # Example
    ///
    /// ```rust
    /// use soroban_pipeline::PipelineConfig;
    ///
    /// let config = PipelineConfig::custom("http://127.0.0.1:8000", "My Network").unwrap();
    /// assert_eq!(config.rpc_url().as_str(), "http://127.0.0.1:8000/");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn custom(rpc_url: &str, network_id: impl Into<String>) -> PipelineResult<Self> {
        let network_id = network_id.into();
        let network = Network::from_passphrase(&network_id);
        Ok(Self::preset(network, Url::parse(rpc_url)?, network_id))
    }

    /// Reads `SOROBAN_RPC_URL`, `SOROBAN_NETWORK_PASSPHRASE` and optionally
    /// `SOROBAN_BASE_FEE` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if a required variable is missing or
    /// a value does not parse.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| PipelineError::Config(format!("{key} is not set")))
        };
        let mut config = Self::custom(&require(ENV_RPC_URL)?, require(ENV_NETWORK_PASSPHRASE)?)?;
        if let Some(fee) = lookup(ENV_BASE_FEE) {
            let fee = fee.trim().parse().map_err(|e| {
                PipelineError::Config(format!("{ENV_BASE_FEE} is not a fee: {e}"))
            })?;
            config = config.with_base_fee(fee);
        }
        Ok(config)
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration for transient transport failures.
    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables automatic retry for RPC calls.
    ///
    /// This is equivalent to `with_retry(RetryConfig::no_retry())`.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Sets the policy applied while the node answers "try again later".
    #[must_use]
    pub fn with_submit_retry(mut self, submit_retry: RetryConfig) -> Self {
        self.submit_retry = submit_retry;
        self
    }

    /// Sets the connection pool configuration.
    #[must_use]
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Sets the base fee applied before resource fees.
    #[must_use]
    pub fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Sets how often the finality poller queries the node.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets how long the finality poller waits before reporting a timeout.
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Inflates simulated resource fees by the given percentage.
    #[must_use]
    pub fn with_resource_fee_margin(mut self, percent: u32) -> Self {
        self.resource_fee_margin_pct = percent;
        self
    }

    /// Sets the resource fee attached to TTL extension and restore operations.
    #[must_use]
    pub fn with_lifetime_resource_fee(mut self, fee: i64) -> Self {
        self.lifetime_resource_fee = fee;
        self
    }

    /// Returns the network this config is for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the RPC endpoint.
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Returns the network passphrase.
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the transport retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Returns the submission retry configuration.
    pub fn submit_retry(&self) -> &RetryConfig {
        &self.submit_retry
    }

    /// Returns the connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Returns the base fee.
    pub fn base_fee(&self) -> u64 {
        self.base_fee
    }

    /// Returns the polling interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the polling deadline.
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Returns the resource fee margin in percent.
    pub fn resource_fee_margin(&self) -> u32 {
        self.resource_fee_margin_pct
    }

    /// Returns the resource fee of lifetime operations.
    pub fn lifetime_resource_fee(&self) -> i64 {
        self.lifetime_resource_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_testnet_config() {
        let config = PipelineConfig::testnet();
        assert_eq!(config.network(), Network::Testnet);
        assert!(config.rpc_url().as_str().contains("testnet"));
        assert_eq!(config.network_id(), "Test SDF Network ; September 2015");
        assert_eq!(config.base_fee(), DEFAULT_BASE_FEE);
    }

    #[test]
    fn test_futurenet_config() {
        let config = PipelineConfig::futurenet();
        assert_eq!(config.network(), Network::Futurenet);
        assert!(config.network_id().contains("Future"));
    }

    #[test]
    fn test_local_config() {
        let local = PipelineConfig::local();
        assert_eq!(local.network(), Network::Local);
        assert_eq!(local.retry_config().max_retries, 5);
        assert_eq!(local.pool_config().max_idle_per_host, Some(8));
    }

    #[test]
    fn test_custom_config() {
        let config = PipelineConfig::custom("https://rpc.example.com", "Example ; 2024").unwrap();
        assert_eq!(config.network(), Network::Custom);
        assert_eq!(config.network_id(), "Example ; 2024");

        let known = PipelineConfig::custom(
            "https://rpc.example.com",
            "Test SDF Network ; September 2015",
        )
        .unwrap();
        assert_eq!(known.network(), Network::Testnet);

        assert!(PipelineConfig::custom("not a url", "x").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::testnet()
            .with_timeout(Duration::from_secs(60))
            .without_retry()
            .with_submit_retry(RetryConfig::no_retry())
            .with_base_fee(250)
            .with_poll_interval(Duration::from_millis(200))
            .with_poll_timeout(Duration::from_secs(5))
            .with_resource_fee_margin(15)
            .with_lifetime_resource_fee(42)
            .with_pool(PoolConfig::low_latency());

        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.retry_config().max_retries, 0);
        assert_eq!(config.submit_retry().max_retries, 0);
        assert_eq!(config.base_fee(), 250);
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
        assert_eq!(config.resource_fee_margin(), 15);
        assert_eq!(config.lifetime_resource_fee(), 42);
        assert!(config.pool_config().tcp_keepalive.is_none());
    }

    #[test]
    fn test_submit_retry_defaults_to_submission_preset() {
        let config = PipelineConfig::testnet();
        assert_eq!(config.submit_retry().max_elapsed_ms, Some(20_000));
        assert!(!config.submit_retry().jitter);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_RPC_URL, "http://127.0.0.1:8000"),
            (ENV_NETWORK_PASSPHRASE, "Standalone Network ; February 2017"),
            (ENV_BASE_FEE, "300"),
        ]
        .into_iter()
        .collect();
        let config =
            PipelineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.network(), Network::Local);
        assert_eq!(config.base_fee(), 300);
    }

    #[test]
    fn test_from_lookup_missing_or_invalid() {
        let err = PipelineConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(ENV_RPC_URL));

        let err = PipelineConfig::from_lookup(|key| match key {
            ENV_BASE_FEE => Some("lots".to_string()),
            ENV_RPC_URL => Some("http://127.0.0.1:8000".to_string()),
            _ => Some("net".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
