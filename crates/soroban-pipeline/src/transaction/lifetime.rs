//! Storage rent: TTL extension and restore.
//!
//! Ledger entries expire unless their time-to-live is extended, and expired
//! persistent entries must be restored before use. Both operations declare
//! their footprint up front (a single key, no instructions, no bytes), so
//! they skip simulation and go straight to assembly.

use crate::api::response::RestorePreamble;
use crate::error::PipelineResult;
use crate::transaction::assemble::Assembler;
use crate::transaction::builder::{AccountCursor, EnvelopeBuilder};
use soroban_pipeline_types::{LedgerKey, Operation, ResourceFootprint, TransactionEnvelope};
use tracing::{debug, warn};

/// An extend or restore request with its hand-built footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifetimeRequest {
    operation: Operation,
    footprint: ResourceFootprint,
}

impl LifetimeRequest {
    /// Extends `key` so it stays live until `live_until_ledger`.
    ///
    /// Works for contract code, contract instances and data keys alike; the
    /// key goes in the read-only set.
    pub fn extend_ttl(key: LedgerKey, live_until_ledger: u32, resource_fee: i64) -> Self {
        Self {
            operation: Operation::ExtendTtl { live_until_ledger },
            footprint: ResourceFootprint::for_extend_ttl(key, resource_fee),
        }
    }

    /// Restores an archived `key`; the key goes in the read-write set.
    pub fn restore(key: LedgerKey, resource_fee: i64) -> Self {
        if !key.is_restorable() {
            warn!(key = %key, "Temporary entries cannot be restored; the node will reject this");
        }
        Self {
            operation: Operation::Restore,
            footprint: ResourceFootprint::for_restore(key, resource_fee),
        }
    }

    /// Restores the entries a simulation reported as archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the preamble is malformed.
    pub fn from_preamble(preamble: &RestorePreamble) -> PipelineResult<Self> {
        let mut footprint = preamble.footprint()?;
        footprint.resource_fee = footprint.resource_fee.max(preamble.min_resource_fee()?);
        Ok(Self {
            operation: Operation::Restore,
            footprint,
        })
    }

    /// The operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// The footprint.
    pub fn footprint(&self) -> &ResourceFootprint {
        &self.footprint
    }

    /// Builds and assembles the envelope, ready for signing.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence number or fee overflows.
    pub fn envelope(
        &self,
        builder: &EnvelopeBuilder,
        assembler: &Assembler,
        cursor: &mut AccountCursor,
    ) -> PipelineResult<TransactionEnvelope> {
        let unsigned = builder.build_operation(cursor, self.operation.clone())?;
        let envelope = assembler.assemble(&unsigned, &self.footprint, self.footprint.resource_fee)?;
        debug!(
            operation = self.operation.name(),
            keys = self.footprint.key_count(),
            sequence = envelope.tx.sequence,
            "Prepared lifetime envelope"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::builder::TransactionOptions;
    use soroban_pipeline_types::{AccountId, ContractAddress, Durability, Hash32, ScValue};

    fn keys() -> Vec<LedgerKey> {
        let contract = ContractAddress::new([4u8; 32]);
        vec![
            LedgerKey::contract_code(Hash32::sha256(b"token wasm")),
            LedgerKey::contract_instance(contract),
            LedgerKey::contract_data(contract, ScValue::symbol("Admin"), Durability::Persistent),
        ]
    }

    #[test]
    fn test_single_key_zero_cost_footprints() {
        for key in keys() {
            let extend = LifetimeRequest::extend_ttl(key.clone(), 535_670, 0);
            assert_eq!(extend.footprint().read_only, vec![key.clone()]);
            assert!(extend.footprint().read_write.is_empty());
            assert!(extend.footprint().is_zero_cost());

            let restore = LifetimeRequest::restore(key.clone(), 0);
            assert_eq!(restore.footprint().read_write, vec![key]);
            assert!(restore.footprint().read_only.is_empty());
            assert!(restore.footprint().is_zero_cost());
            assert_eq!(restore.operation(), &Operation::Restore);
        }
    }

    #[test]
    fn test_envelope_carries_footprint() {
        let code = LedgerKey::contract_code(Hash32::sha256(b"token wasm"));
        let request = LifetimeRequest::extend_ttl(code.clone(), 535_670, 20_000);
        let builder = EnvelopeBuilder::new(TransactionOptions::new("Test Network").fee(100));
        let mut cursor = AccountCursor::new(AccountId::new([6u8; 32]), 10);

        let envelope = request
            .envelope(&builder, &Assembler::new(), &mut cursor)
            .unwrap();
        assert_eq!(
            envelope.tx.operation,
            Operation::ExtendTtl {
                live_until_ledger: 535_670
            }
        );
        let resources = envelope.tx.resources.as_ref().unwrap();
        assert_eq!(resources.read_only, vec![code]);
        assert_eq!(resources.instructions, 0);
        assert_eq!(envelope.tx.fee, 20_100);
        assert_eq!(cursor.sequence(), 11);
    }

    #[test]
    fn test_from_preamble() {
        let key = keys().pop().unwrap();
        let preamble = RestorePreamble {
            transaction_data: ResourceFootprint::for_restore(key.clone(), 100)
                .to_base64()
                .unwrap(),
            min_resource_fee: "2500".into(),
        };
        let request = LifetimeRequest::from_preamble(&preamble).unwrap();
        assert_eq!(request.footprint().read_write, vec![key]);
        assert_eq!(request.footprint().resource_fee, 2_500);
    }
}
