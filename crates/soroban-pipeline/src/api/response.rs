//! Node response types.
//!
//! Field names follow the node's camelCase JSON. Fees travel as decimal
//! strings since they may exceed the 2^53 range of JSON numbers; the
//! accessors parse them.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use soroban_pipeline_types::{Hash32, ResourceFootprint, ScValue};
use std::fmt;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub(crate) jsonrpc: &'static str,
    pub(crate) id: u64,
    pub(crate) method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) params: Option<serde_json::Value>,
}

/// A JSON-RPC 2.0 response carrying either a result or an error.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub(crate) result: Option<T>,
    pub(crate) error: Option<RpcErrorObject>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub(crate) code: i64,
    pub(crate) message: String,
}

fn parse_amount(field: &str, value: &str) -> PipelineResult<i64> {
    value.trim().parse().map_err(|e| {
        PipelineError::Internal(format!("node sent a non-integer {field} '{value}': {e}"))
    })
}

/// Result of `getNetwork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// The network passphrase.
    pub passphrase: String,
    /// Protocol version the node runs.
    #[serde(default)]
    pub protocol_version: u32,
}

/// Result of `getLatestLedger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestLedger {
    /// Hash of the ledger header.
    #[serde(default)]
    pub id: String,
    /// Ledger sequence.
    pub sequence: u32,
    /// Protocol version of the ledger.
    #[serde(default)]
    pub protocol_version: u32,
}

/// Result of `getAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// The account id.
    pub id: String,
    /// Current sequence number, as a decimal string.
    pub sequence: String,
}

impl AccountInfo {
    /// Parses the current sequence number.
    ///
    /// # Errors
    ///
    /// Returns an error if the node sent something other than an integer.
    pub fn sequence(&self) -> PipelineResult<i64> {
        parse_amount("sequence", &self.sequence)
    }
}

/// One invocation result of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateHostResult {
    /// base64(BCS) of the returned [`ScValue`].
    pub retval: String,
}

impl SimulateHostResult {
    /// Decodes the returned value.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid encoded value.
    pub fn value(&self) -> PipelineResult<ScValue> {
        decode_value(&self.retval)
    }
}

/// Footprint and fee needed to restore archived entries before a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreamble {
    /// base64(BCS) of the [`ResourceFootprint`] of the restore.
    pub transaction_data: String,
    /// Minimum resource fee of the restore, as a decimal string.
    pub min_resource_fee: String,
}

impl RestorePreamble {
    /// Decodes the restore footprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid encoded footprint.
    pub fn footprint(&self) -> PipelineResult<ResourceFootprint> {
        Ok(ResourceFootprint::from_base64(&self.transaction_data)?)
    }

    /// Parses the minimum resource fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the node sent something other than an integer.
    pub fn min_resource_fee(&self) -> PipelineResult<i64> {
        parse_amount("minResourceFee", &self.min_resource_fee)
    }
}

/// Result of `simulateTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    /// Ledger the simulation ran against.
    #[serde(default)]
    pub latest_ledger: u32,
    /// Minimum resource fee, as a decimal string.
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    /// base64(BCS) of the estimated [`ResourceFootprint`].
    #[serde(default)]
    pub transaction_data: Option<String>,
    /// Invocation results; one entry for a contract call.
    #[serde(default)]
    pub results: Vec<SimulateHostResult>,
    /// Failure reported by the node.
    #[serde(default)]
    pub error: Option<String>,
    /// Present when archived entries must be restored first.
    #[serde(default)]
    pub restore_preamble: Option<RestorePreamble>,
}

/// Status of `sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    /// Accepted into the pending queue.
    Pending,
    /// Already held by the node.
    Duplicate,
    /// Transient back-pressure; resubmit later.
    TryAgainLater,
    /// Rejected.
    Error,
}

impl SendStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Duplicate => "DUPLICATE",
            Self::TryAgainLater => "TRY_AGAIN_LATER",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Submission status.
    pub status: SendStatus,
    /// Hex hash of the transaction.
    pub hash: String,
    /// Latest ledger known to the node.
    #[serde(default)]
    pub latest_ledger: u32,
    /// Rejection reason, for `ERROR`.
    #[serde(default)]
    pub error_result: Option<String>,
}

impl SendResponse {
    /// Parses the transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is not 64 hex characters.
    pub fn hash(&self) -> PipelineResult<Hash32> {
        Ok(Hash32::from_hex(&self.hash)?)
    }
}

/// Status of `getTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    /// Not (yet) in the ledger.
    NotFound,
    /// Included and succeeded.
    Success,
    /// Included and failed.
    Failed,
}

/// Result of `getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    /// Transaction status.
    pub status: TxStatus,
    /// Latest ledger known to the node.
    #[serde(default)]
    pub latest_ledger: u32,
    /// Ledger the transaction was included in.
    #[serde(default)]
    pub ledger: Option<u32>,
    /// base64(BCS) of the returned [`ScValue`], on success.
    #[serde(default)]
    pub return_value: Option<String>,
    /// Failure reason, on failure.
    #[serde(default)]
    pub result_error: Option<String>,
}

impl GetTransactionResponse {
    /// Decodes the return value, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid encoded value.
    pub fn return_value(&self) -> PipelineResult<Option<ScValue>> {
        self.return_value.as_deref().map(decode_value).transpose()
    }
}

pub(crate) fn decode_value(encoded: &str) -> PipelineResult<ScValue> {
    let bytes = base64::decode(encoded.trim())?;
    Ok(bcs::from_bytes(&bytes)?)
}

/// Encodes a value the way the node returns it.
///
/// # Errors
///
/// Returns an error if BCS serialization fails.
pub fn encode_value(value: &ScValue) -> PipelineResult<String> {
    Ok(base64::encode(bcs::to_bytes(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_status_wire_names() {
        let parsed: SendStatus = serde_json::from_value(json!("TRY_AGAIN_LATER")).unwrap();
        assert_eq!(parsed, SendStatus::TryAgainLater);
        assert_eq!(SendStatus::Duplicate.to_string(), "DUPLICATE");
    }

    #[test]
    fn test_simulate_response_minimal() {
        let parsed: SimulateResponse =
            serde_json::from_value(json!({ "latestLedger": 7, "error": "boom" })).unwrap();
        assert_eq!(parsed.latest_ledger, 7);
        assert_eq!(parsed.error.as_deref(), Some("boom"));
        assert!(parsed.results.is_empty());
        assert!(parsed.restore_preamble.is_none());
    }

    #[test]
    fn test_account_sequence() {
        let info: AccountInfo =
            serde_json::from_value(json!({ "id": "Gabc", "sequence": "9007199254740993" }))
                .unwrap();
        assert_eq!(info.sequence().unwrap(), 9_007_199_254_740_993);

        let bad = AccountInfo {
            id: "G".into(),
            sequence: "x".into(),
        };
        assert!(bad.sequence().is_err());
    }

    #[test]
    fn test_return_value() {
        let encoded = encode_value(&ScValue::U32(42)).unwrap();
        let response: GetTransactionResponse = serde_json::from_value(json!({
            "status": "SUCCESS",
            "latestLedger": 10,
            "ledger": 9,
            "returnValue": encoded,
        }))
        .unwrap();
        assert_eq!(response.status, TxStatus::Success);
        assert_eq!(response.return_value().unwrap(), Some(ScValue::U32(42)));
    }

    #[test]
    fn test_rpc_request_omits_missing_params() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getNetwork",
            params: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("params").is_none());
        assert_eq!(value["method"], "getNetwork");
    }
}
