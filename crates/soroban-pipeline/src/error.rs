//! Error types for the pipeline.
//!
//! Every stage returns [`PipelineError`]. The node-facing failures of a call
//! (simulation, submission, execution, polling deadline) are distinct variants
//! so callers can branch on [`PipelineError::kind`] without knowing which
//! stage produced the error.

use crate::api::response::SendStatus;
use crate::retry::DEFAULT_RETRYABLE_STATUS_CODES;
use soroban_pipeline_types::{Hash32, TypesError};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A specialized Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// A contract-level error code embedded in a node response, with its domain
/// name when the code is known to the active [`ErrorCatalog`].
///
/// [`ErrorCatalog`]: crate::transaction::ErrorCatalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    /// The numeric code raised by the contract.
    pub code: u32,
    /// The domain name of the code, if known.
    pub name: Option<String>,
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} (#{})", self.code),
            None => write!(f, "#{}", self.code),
        }
    }
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network, HTTP or JSON-RPC transport failure.
    Transport,
    /// The invocation payload could not be decoded into an operation.
    InvalidOperationEncoding,
    /// The node rejected the dry run.
    SimulationFailed,
    /// The signer refused or failed to sign.
    SignerDeclined,
    /// The node refused the signed envelope.
    SubmissionRejected,
    /// The transaction was included in the ledger but failed.
    ExecutionFailed,
    /// No final outcome was observed before the deadline.
    Timeout,
    /// A local value could not be parsed or decoded.
    Decoding,
    /// Invalid or mismatched configuration.
    Config,
    /// A named entry does not exist.
    NotFound,
    /// Anything else.
    Internal,
}

/// The main error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during BCS serialization/deserialization
    #[error("BCS error: {0}")]
    Bcs(String),

    /// Error occurred during base64 decoding
    #[error("Base64 error: {0}")]
    Base64(String),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error reading or writing a local file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The node answered with a JSON-RPC error object
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// The node answered with a non-success HTTP status
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message or body excerpt
        message: String,
    },

    /// The invocation payload is not a valid operation
    #[error("Invalid operation encoding: {0}")]
    InvalidOperationEncoding(String),

    /// The node rejected the dry run
    #[error("Simulation failed: {message}")]
    SimulationFailed {
        /// Message reported by the node
        message: String,
        /// Embedded contract error, if any
        contract_error: Option<ContractError>,
    },

    /// The signer refused or failed to sign
    #[error("Signer declined: {0}")]
    SignerDeclined(String),

    /// The node refused the signed envelope
    #[error("Submission rejected ({status}): {message}")]
    SubmissionRejected {
        /// Status reported by the node
        status: SendStatus,
        /// Hash of the refused transaction, when known
        hash: Option<Hash32>,
        /// Human readable reason
        message: String,
        /// Embedded contract error, if any
        contract_error: Option<ContractError>,
    },

    /// The transaction failed on the ledger
    #[error("Execution failed for {hash}: {message}")]
    ExecutionFailed {
        /// Hash of the failed transaction
        hash: Hash32,
        /// Human readable reason
        message: String,
        /// Embedded contract error, if any
        contract_error: Option<ContractError>,
    },

    /// No final outcome was observed before the deadline
    #[error("Transaction {hash} still pending after {waited:?}")]
    Timeout {
        /// Hash of the pending transaction
        hash: Hash32,
        /// How long the poller waited
        waited: Duration,
    },

    /// Invalid account or contract identifier
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A return value did not match the expected type
    #[error("Result decoding error: {0}")]
    ResultDecoding(String),

    /// Named entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal pipeline error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "private_key",
    "secret",
    "password",
    "mnemonic",
    "seed",
    "bearer",
    "authorization",
];

impl PipelineError {
    /// Creates a new BCS error
    pub fn bcs<E: fmt::Display>(err: E) -> Self {
        Self::Bcs(err.to_string())
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a simulation failure without a contract error
    pub fn simulation(message: impl Into<String>) -> Self {
        Self::SimulationFailed {
            message: message.into(),
            contract_error: None,
        }
    }

    /// Returns the coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Rpc { .. } | Self::Api { .. } => ErrorKind::Transport,
            Self::InvalidOperationEncoding(_) => ErrorKind::InvalidOperationEncoding,
            Self::SimulationFailed { .. } => ErrorKind::SimulationFailed,
            Self::SignerDeclined(_) => ErrorKind::SignerDeclined,
            Self::SubmissionRejected { .. } => ErrorKind::SubmissionRejected,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Json(_)
            | Self::Bcs(_)
            | Self::Base64(_)
            | Self::Hex(_)
            | Self::InvalidAddress(_)
            | Self::ResultDecoding(_) => ErrorKind::Decoding,
            Self::Url(_) | Self::Config(_) => ErrorKind::Config,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) | Self::Internal(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// Returns the contract error embedded in a node-reported failure
    pub fn contract_error(&self) -> Option<&ContractError> {
        match self {
            Self::SimulationFailed { contract_error, .. }
            | Self::SubmissionRejected { contract_error, .. }
            | Self::ExecutionFailed { contract_error, .. } => contract_error.as_ref(),
            _ => None,
        }
    }

    /// Returns the transaction hash the error refers to, if any
    pub fn tx_hash(&self) -> Option<Hash32> {
        match self {
            Self::ExecutionFailed { hash, .. } | Self::Timeout { hash, .. } => Some(*hash),
            Self::SubmissionRejected { hash, .. } => *hash,
            _ => None,
        }
    }

    /// Returns true if the node asked for the submission to be retried later
    pub fn is_try_again(&self) -> bool {
        matches!(
            self,
            Self::SubmissionRejected {
                status: SendStatus::TryAgainLater,
                ..
            }
        )
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Api {
                    status_code: 404,
                    ..
                }
        )
    }

    /// Returns true if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if this is a transient transport error that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Api { status_code, .. } => DEFAULT_RETRYABLE_STATUS_CODES.contains(status_code),
            _ => false,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// This method:
    /// - Removes control characters that could corrupt logs
    /// - Truncates very long messages to prevent log flooding
    /// - Redacts patterns that might indicate sensitive information
    ///
    /// # Example
    ///
    /// ```rust
    /// use soroban_pipeline::PipelineError;
    ///
    /// let err = PipelineError::api(500, "Internal server error with details...");
    /// let safe_msg = err.sanitized_message();
    /// assert!(safe_msg.contains("500"));
    /// ```
    pub fn sanitized_message(&self) -> String {
        let raw_message = self.to_string();
        Self::sanitize_string(&raw_message)
    }

    fn sanitize_string(s: &str) -> String {
        // Newlines and tabs are kept for readability
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            let mut end = MAX_ERROR_MESSAGE_LENGTH;
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..end],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }

    /// Returns the error message suitable for display to end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(_) => "Network error occurred",
            Self::Json(_) => "Failed to process response",
            Self::Bcs(_) | Self::Base64(_) => "Failed to process data",
            Self::Hex(_) => "Invalid hex format",
            Self::Url(_) => "Invalid URL",
            Self::Io(_) => "File access failed",
            Self::Rpc { .. } => "Node rejected the request",
            Self::NotFound(_)
            | Self::Api {
                status_code: 404, ..
            } => "Resource not found",
            Self::Api {
                status_code: 429, ..
            } => "Rate limit exceeded",
            Self::Api { status_code, .. } if *status_code >= 500 => "Server error",
            Self::Api { .. } => "API error",
            Self::InvalidOperationEncoding(_) => "Invalid contract call",
            Self::SimulationFailed { .. } => "Transaction simulation failed",
            Self::SignerDeclined(_) => "Signing was declined",
            Self::SubmissionRejected { .. } => "Transaction submission rejected",
            Self::ExecutionFailed { .. } => "Transaction execution failed",
            Self::Timeout { .. } => "Transaction outcome not yet known",
            Self::InvalidAddress(_) => "Invalid address",
            Self::ResultDecoding(_) => "Unexpected contract result",
            Self::Config(_) => "Configuration error",
            Self::Internal(_) => "Internal error",
            Self::Other(_) => "An error occurred",
        }
    }
}

impl From<TypesError> for PipelineError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::Hex(e) => Self::Hex(e),
            TypesError::Base64(e) => Self::Base64(e.to_string()),
            TypesError::Bcs(e) => Self::bcs(e),
            TypesError::InvalidLength { .. } | TypesError::InvalidAddress(_) => {
                Self::InvalidAddress(err.to_string())
            }
        }
    }
}

impl From<bcs::Error> for PipelineError {
    fn from(err: bcs::Error) -> Self {
        Self::bcs(err)
    }
}

impl From<base64::DecodeError> for PipelineError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}
