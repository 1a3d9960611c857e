//! Transactions and envelopes.

use crate::address::AccountId;
use crate::codec;
use crate::error::{TypesError, TypesResult};
use crate::footprint::ResourceFootprint;
use crate::hash::Hash32;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};

/// Validity window of a transaction, in seconds since the Unix epoch.
///
/// A zero bound is not enforced, so `0/0` is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    /// Earliest time the transaction is valid, or 0.
    pub min_time: u64,
    /// Latest time the transaction is valid, or 0.
    pub max_time: u64,
}

impl TimeBounds {
    /// No validity window.
    pub const UNBOUNDED: Self = Self {
        min_time: 0,
        max_time: 0,
    };

    /// A window closing `timeout_secs` after `now_secs`.
    pub fn timeout(now_secs: u64, timeout_secs: u64) -> Self {
        Self {
            min_time: 0,
            max_time: now_secs.saturating_add(timeout_secs),
        }
    }

    /// Returns true if neither bound is enforced.
    pub fn is_unbounded(&self) -> bool {
        self.min_time == 0 && self.max_time == 0
    }
}

/// An unsigned transaction with exactly one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The submitting account.
    pub source: AccountId,
    /// Total fee: base fee plus the resource fee once assembled.
    pub fee: u64,
    /// Sequence number; must be exactly one more than the account's current one.
    pub sequence: i64,
    /// Validity window.
    pub time_bounds: TimeBounds,
    /// The operation.
    pub operation: Operation,
    /// Footprint and resource fee, attached by assembly.
    pub resources: Option<ResourceFootprint>,
}

impl Transaction {
    /// Resource fee already attached, or 0.
    pub fn resource_fee(&self) -> i64 {
        self.resources.as_ref().map_or(0, |r| r.resource_fee)
    }

    /// Bytes covered by signatures: `sha256(network_id) || BCS(tx)`.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn signature_payload(&self, network_id: &str) -> TypesResult<Vec<u8>> {
        let network = Hash32::sha256(network_id.as_bytes());
        let body = bcs::to_bytes(self)?;
        let mut payload = Vec::with_capacity(network.as_bytes().len() + body.len());
        payload.extend_from_slice(network.as_bytes());
        payload.extend_from_slice(&body);
        Ok(payload)
    }

    /// The network-scoped transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn hash(&self, network_id: &str) -> TypesResult<Hash32> {
        Ok(Hash32::sha256(self.signature_payload(network_id)?))
    }
}

/// One signature together with a hint identifying the signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    /// Last four bytes of the signer's public key.
    pub hint: [u8; 4],
    /// Signature over the transaction hash.
    pub signature: Vec<u8>,
}

impl DecoratedSignature {
    /// Creates a decorated signature, deriving the hint from the public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key is shorter than four bytes.
    pub fn new(public_key: &[u8], signature: Vec<u8>) -> TypesResult<Self> {
        let start = public_key
            .len()
            .checked_sub(4)
            .ok_or(TypesError::InvalidLength {
                expected: 4,
                actual: public_key.len(),
            })?;
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&public_key[start..]);
        Ok(Self { hint, signature })
    }
}

/// A transaction and the signatures attached to it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// The transaction.
    pub tx: Transaction,
    /// Attached signatures.
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    /// Wraps a transaction in an unsigned envelope.
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Returns true once at least one signature is attached.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Appends a signature.
    pub fn add_signature(&mut self, signature: DecoratedSignature) {
        self.signatures.push(signature);
    }

    /// The network-scoped hash of the inner transaction.
    ///
    /// Independent of the signatures attached.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn hash(&self, network_id: &str) -> TypesResult<Hash32> {
        self.tx.hash(network_id)
    }

    /// Serializes to base64(BCS), the form exchanged with signers and the node.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_base64(&self) -> TypesResult<String> {
        codec::to_base64(self)
    }

    /// Parses the base64(BCS) form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid encoded envelope.
    pub fn from_base64(encoded: &str) -> TypesResult<Self> {
        codec::from_base64(encoded)
    }
}
