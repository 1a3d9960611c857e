//! The single operation carried by a transaction.

use crate::address::ContractAddress;
use crate::codec;
use crate::error::TypesResult;
use crate::value::ScValue;
use serde::{Deserialize, Serialize};

/// One operation. Every transaction built by this workspace carries exactly
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Calls a function on a deployed contract.
    InvokeContract {
        /// The contract to call.
        contract: ContractAddress,
        /// Function name.
        function: String,
        /// Call arguments.
        args: Vec<ScValue>,
    },
    /// Extends the TTL of every read-only key in the footprint.
    ExtendTtl {
        /// Ledger sequence the entries must stay live until.
        live_until_ledger: u32,
    },
    /// Restores every archived read-write key in the footprint.
    Restore,
}

impl Operation {
    /// Builds a contract invocation.
    pub fn invoke(
        contract: ContractAddress,
        function: impl Into<String>,
        args: impl IntoIterator<Item = ScValue>,
    ) -> Self {
        Self::InvokeContract {
            contract,
            function: function.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Short name of the operation for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvokeContract { .. } => "invoke_contract",
            Self::ExtendTtl { .. } => "extend_ttl",
            Self::Restore => "restore",
        }
    }

    /// Serializes to base64(BCS).
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_base64(&self) -> TypesResult<String> {
        codec::to_base64(self)
    }

    /// Parses an operation from base64(BCS).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not base64 or does not decode to an operation.
    pub fn from_base64(encoded: &str) -> TypesResult<Self> {
        codec::from_base64(encoded)
    }
}
