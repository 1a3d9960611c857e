//! Envelope builder.

use crate::error::{PipelineError, PipelineResult};
use soroban_pipeline_types::{
    AccountId, Operation, TimeBounds, Transaction, TransactionEnvelope,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Options applied to every envelope a builder produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    fee: u64,
    time_bounds: TimeBounds,
    network_id: String,
}

impl TransactionOptions {
    /// Creates options for a network with the default base fee and no time bound.
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            fee: crate::config::DEFAULT_BASE_FEE,
            time_bounds: TimeBounds::UNBOUNDED,
            network_id: network_id.into(),
        }
    }

    /// Sets the base fee, before the resource fee is added.
    #[must_use]
    pub fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Sets an explicit validity window.
    #[must_use]
    pub fn time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.time_bounds = time_bounds;
        self
    }

    /// Closes the validity window `seconds` from now.
    ///
    /// Uses saturating arithmetic to handle edge cases like system time going backwards.
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.time_bounds = TimeBounds::timeout(now, seconds);
        self
    }

    /// The base fee.
    pub fn base_fee(&self) -> u64 {
        self.fee
    }

    /// The validity window.
    pub fn bounds(&self) -> TimeBounds {
        self.time_bounds
    }

    /// The network identifier used for hashing and signing.
    pub fn network_id(&self) -> &str {
        &self.network_id
    }
}

/// The submitting account and its current sequence number.
///
/// Owned by one call. Refresh it from the node before each call; building an
/// envelope advances it locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountCursor {
    account: AccountId,
    sequence: i64,
}

impl AccountCursor {
    /// Creates a cursor at the account's current sequence number.
    pub fn new(account: AccountId, sequence: i64) -> Self {
        Self { account, sequence }
    }

    /// The account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// The last sequence number used or reported by the node.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Advances the cursor and returns the sequence number to use.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence number would overflow.
    pub fn next_sequence(&mut self) -> PipelineResult<i64> {
        let next = self.sequence.checked_add(1).ok_or_else(|| {
            PipelineError::Internal(format!("sequence overflow for {}", self.account))
        })?;
        self.sequence = next;
        Ok(next)
    }
}

/// Builds unsigned single-operation envelopes.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    options: TransactionOptions,
}

impl EnvelopeBuilder {
    /// Creates a builder.
    pub fn new(options: TransactionOptions) -> Self {
        Self { options }
    }

    /// The options applied by this builder.
    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    /// Builds an unsigned envelope from a base64 operation.
    ///
    /// The cursor is left untouched if the payload does not decode.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidOperationEncoding`] if the payload is not
    /// a valid operation.
    pub fn build(
        &self,
        cursor: &mut AccountCursor,
        serialized_operation: &str,
    ) -> PipelineResult<TransactionEnvelope> {
        let operation = decode_operation(serialized_operation)?;
        self.build_operation(cursor, operation)
    }

    /// Builds an unsigned envelope from an operation value.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence number would overflow.
    pub fn build_operation(
        &self,
        cursor: &mut AccountCursor,
        operation: Operation,
    ) -> PipelineResult<TransactionEnvelope> {
        let sequence = cursor.next_sequence()?;
        debug!(
            source = %cursor.account(),
            sequence,
            operation = operation.name(),
            "Built envelope"
        );
        Ok(TransactionEnvelope::new(Transaction {
            source: cursor.account(),
            fee: self.options.fee,
            sequence,
            time_bounds: self.options.time_bounds,
            operation,
            resources: None,
        }))
    }
}

/// Decodes a base64 operation payload.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidOperationEncoding`] if the payload is not
/// a valid operation.
pub fn decode_operation(serialized_operation: &str) -> PipelineResult<Operation> {
    Operation::from_base64(serialized_operation)
        .map_err(|e| PipelineError::InvalidOperationEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_pipeline_types::ContractAddress;

    fn cursor() -> AccountCursor {
        AccountCursor::new(AccountId::new([9u8; 32]), 41)
    }

    fn operation_b64() -> String {
        Operation::invoke(ContractAddress::new([1u8; 32]), "ping", Vec::new())
            .to_base64()
            .unwrap()
    }

    #[test]
    fn test_build_uses_next_sequence() {
        let builder = EnvelopeBuilder::new(TransactionOptions::new("Test Network").fee(250));
        let mut cursor = cursor();
        let envelope = builder.build(&mut cursor, &operation_b64()).unwrap();
        assert_eq!(envelope.tx.sequence, 42);
        assert_eq!(envelope.tx.fee, 250);
        assert!(envelope.tx.time_bounds.is_unbounded());
        assert!(envelope.tx.resources.is_none());
        assert!(!envelope.is_signed());
        assert_eq!(cursor.sequence(), 42);
    }

    #[test]
    fn test_sequences_strictly_increase() {
        let builder = EnvelopeBuilder::new(TransactionOptions::new("Test Network"));
        let mut cursor = cursor();
        let payload = operation_b64();
        let sequences: Vec<i64> = (0..5)
            .map(|_| builder.build(&mut cursor, &payload).unwrap().tx.sequence)
            .collect();
        assert!(sequences.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_encoding_leaves_cursor() {
        let builder = EnvelopeBuilder::new(TransactionOptions::new("Test Network"));
        let mut cursor = cursor();
        let err = builder.build(&mut cursor, "not base64!").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOperationEncoding(_)));
        assert_eq!(cursor.sequence(), 41);

        let err = builder.build(&mut cursor, "AAAAAAAA").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOperationEncoding(_)));
        assert_eq!(cursor.sequence(), 41);
    }

    #[test]
    fn test_decode_operation() {
        let op = decode_operation(&operation_b64()).unwrap();
        assert_eq!(op.name(), "invoke_contract");
        assert!(matches!(
            decode_operation("not base64!").unwrap_err(),
            PipelineError::InvalidOperationEncoding(_)
        ));
    }

    #[test]
    fn test_timeout_sets_max_time() {
        let options = TransactionOptions::new("Test Network").timeout(30);
        assert!(options.bounds().max_time > 30);
        assert_eq!(options.bounds().min_time, 0);
    }

    #[test]
    fn test_sequence_overflow() {
        let mut cursor = AccountCursor::new(AccountId::new([0u8; 32]), i64::MAX);
        assert!(cursor.next_sequence().is_err());
        assert_eq!(cursor.sequence(), i64::MAX);
    }
}
