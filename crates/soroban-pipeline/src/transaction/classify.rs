//! Error classification.
//!
//! The node reports failures in three shapes: a simulation `error` string, a
//! `sendTransaction` status with an optional `errorResult`, and a
//! `getTransaction` `FAILED` status with a `resultError`. The functions here
//! normalize all three into [`PipelineError`] variants, decoding the embedded
//! contract error code through an [`ErrorCatalog`].
//!
//! # Example
//!
//! ```rust
//! use soroban_pipeline::transaction::ErrorCatalog;
//!
//! let catalog = ErrorCatalog::new().with(10, "BalanceError");
//! let err = catalog.resolve("HostError: Error(Contract, #10)").unwrap();
//! assert_eq!(err.name.as_deref(), Some("BalanceError"));
//! ```

use crate::api::response::{SendResponse, SendStatus};
use crate::error::{ContractError, PipelineError};
use soroban_pipeline_types::Hash32;
use std::collections::BTreeMap;

const CONTRACT_ERROR_MARKER: &str = "Error(Contract,";

/// Maps numeric contract error codes to domain names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCatalog {
    names: BTreeMap<u32, String>,
}

impl ErrorCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a code.
    #[must_use]
    pub fn with(mut self, code: u32, name: impl Into<String>) -> Self {
        self.names.insert(code, name.into());
        self
    }

    /// Builds a catalog from `(code, name)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(code, name)| (code, name.into()))
                .collect(),
        }
    }

    /// Returns the name registered for `code`.
    pub fn name(&self, code: u32) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no code is registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Extracts the contract error embedded in a node message, if any.
    ///
    /// Unknown codes are still reported, without a name.
    pub fn resolve(&self, message: &str) -> Option<ContractError> {
        let code = parse_contract_code(message)?;
        Some(ContractError {
            code,
            name: self.name(code).map(str::to_owned),
        })
    }
}

/// Parses the code out of `Error(Contract, #<code>)`.
pub fn parse_contract_code(message: &str) -> Option<u32> {
    let start = message.find(CONTRACT_ERROR_MARKER)? + CONTRACT_ERROR_MARKER.len();
    let rest = message[start..].trim_start().strip_prefix('#')?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn describe(message: &str, contract_error: Option<&ContractError>) -> String {
    match contract_error {
        Some(err) => format!("contract error {err}: {message}"),
        None => message.to_string(),
    }
}

/// Classifies a simulation failure reported by the node.
pub fn classify_simulation(message: &str, catalog: &ErrorCatalog) -> PipelineError {
    let contract_error = catalog.resolve(message);
    PipelineError::SimulationFailed {
        message: describe(message, contract_error.as_ref()),
        contract_error,
    }
}

/// Classifies a `sendTransaction` response whose status is not accepted.
pub fn classify_submission(response: &SendResponse, catalog: &ErrorCatalog) -> PipelineError {
    let raw = response
        .error_result
        .as_deref()
        .unwrap_or(match response.status {
            SendStatus::TryAgainLater => "node asked to resubmit later",
            _ => "submission rejected",
        });
    let contract_error = catalog.resolve(raw);
    PipelineError::SubmissionRejected {
        status: response.status,
        hash: response.hash().ok(),
        message: describe(raw, contract_error.as_ref()),
        contract_error,
    }
}

/// Classifies a transaction that failed on the ledger.
pub fn classify_execution(
    hash: Hash32,
    result_error: Option<&str>,
    catalog: &ErrorCatalog,
) -> PipelineError {
    let raw = result_error.unwrap_or("transaction failed");
    let contract_error = catalog.resolve(raw);
    PipelineError::ExecutionFailed {
        hash,
        message: describe(raw, contract_error.as_ref()),
        contract_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn catalog() -> ErrorCatalog {
        ErrorCatalog::from_pairs([(1, "NotInitialized"), (10, "BalanceError")])
    }

    #[test]
    fn test_parse_contract_code() {
        assert_eq!(parse_contract_code("Error(Contract, #10)"), Some(10));
        assert_eq!(
            parse_contract_code("HostError: Error(Contract,#3) at frame 2"),
            Some(3)
        );
        assert_eq!(parse_contract_code("Error(Auth, InvalidAction)"), None);
        assert_eq!(parse_contract_code("Error(Contract, #)"), None);
        assert_eq!(parse_contract_code(""), None);
    }

    #[test]
    fn test_resolve_unknown_code() {
        let err = catalog().resolve("Error(Contract, #77)").unwrap();
        assert_eq!(err.code, 77);
        assert!(err.name.is_none());
    }

    #[test]
    fn test_classify_simulation() {
        let err = classify_simulation("HostError: Error(Contract, #10)", &catalog());
        assert_eq!(err.kind(), ErrorKind::SimulationFailed);
        let contract = err.contract_error().unwrap();
        assert_eq!(contract.name.as_deref(), Some("BalanceError"));
        assert!(err.to_string().contains("BalanceError (#10)"));
    }

    #[test]
    fn test_classify_submission() {
        let response = SendResponse {
            status: SendStatus::Error,
            hash: "ab".repeat(32),
            latest_ledger: 5,
            error_result: Some("txBadSeq".into()),
        };
        let err = classify_submission(&response, &catalog());
        assert_eq!(err.kind(), ErrorKind::SubmissionRejected);
        assert_eq!(err.tx_hash().unwrap().to_hex(), "ab".repeat(32));
        assert!(err.contract_error().is_none());
        assert!(!err.is_try_again());
    }

    #[test]
    fn test_classify_execution() {
        let err = classify_execution(Hash32::ZERO, Some("Error(Contract, #1)"), &catalog());
        assert_eq!(err.kind(), ErrorKind::ExecutionFailed);
        assert_eq!(
            err.contract_error().unwrap().name.as_deref(),
            Some("NotInitialized")
        );

        let err = classify_execution(Hash32::ZERO, None, &catalog());
        assert!(err.to_string().contains("transaction failed"));
    }
}
