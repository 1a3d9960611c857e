//! Resource footprints.

use crate::codec;
use crate::error::TypesResult;
use crate::ledger_key::LedgerKey;
use serde::{Deserialize, Serialize};

/// The declared storage access and resource budget of one operation.
///
/// Produced by simulation (estimated) or built by hand for TTL extension and
/// restoration (exact). An assembled envelope always carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFootprint {
    /// Keys the operation only reads.
    pub read_only: Vec<LedgerKey>,
    /// Keys the operation reads and writes.
    pub read_write: Vec<LedgerKey>,
    /// CPU instruction budget.
    pub instructions: u32,
    /// Bytes read from the ledger.
    pub read_bytes: u32,
    /// Bytes written to the ledger.
    pub write_bytes: u32,
    /// Resource fee in the smallest fee unit.
    pub resource_fee: i64,
}

impl ResourceFootprint {
    /// Footprint of a TTL extension: the key is read-only and no budget is
    /// needed since the operation performs no computation.
    pub fn for_extend_ttl(key: LedgerKey, resource_fee: i64) -> Self {
        Self {
            read_only: vec![key],
            resource_fee,
            ..Default::default()
        }
    }

    /// Footprint of a restoration: the key is read-write because its
    /// expiration metadata is rewritten.
    pub fn for_restore(key: LedgerKey, resource_fee: i64) -> Self {
        Self {
            read_write: vec![key],
            resource_fee,
            ..Default::default()
        }
    }

    /// Total number of keys declared.
    pub fn key_count(&self) -> usize {
        self.read_only.len() + self.read_write.len()
    }

    /// Returns true if no computation or byte budget is declared.
    pub fn is_zero_cost(&self) -> bool {
        self.instructions == 0 && self.read_bytes == 0 && self.write_bytes == 0
    }

    /// Serializes to base64(BCS), the form used on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_base64(&self) -> TypesResult<String> {
        codec::to_base64(self)
    }

    /// Parses the base64(BCS) wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid base64 or not a footprint.
    pub fn from_base64(encoded: &str) -> TypesResult<Self> {
        codec::from_base64(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ContractAddress;
    use crate::hash::Hash32;
    use crate::ledger_key::Durability;
    use crate::value::ScValue;

    fn keys() -> Vec<LedgerKey> {
        let contract = ContractAddress::new([9u8; 32]);
        vec![
            LedgerKey::contract_code(Hash32::new([1u8; 32])),
            LedgerKey::contract_instance(contract),
            LedgerKey::contract_data(contract, ScValue::symbol("Balance"), Durability::Persistent),
        ]
    }

    #[test]
    fn test_extend_footprint_shape_for_every_key_kind() {
        for key in keys() {
            let footprint = ResourceFootprint::for_extend_ttl(key.clone(), 100);
            assert_eq!(footprint.read_only, vec![key]);
            assert!(footprint.read_write.is_empty());
            assert_eq!(footprint.key_count(), 1);
            assert!(footprint.is_zero_cost());
        }
    }

    #[test]
    fn test_restore_footprint_shape_for_every_key_kind() {
        for key in keys() {
            let footprint = ResourceFootprint::for_restore(key.clone(), 100);
            assert_eq!(footprint.read_write, vec![key]);
            assert!(footprint.read_only.is_empty());
            assert_eq!(footprint.key_count(), 1);
            assert!(footprint.is_zero_cost());
        }
    }

    #[test]
    fn test_wire_form() {
        let footprint = ResourceFootprint {
            read_only: keys(),
            read_write: vec![],
            instructions: 1_500_000,
            read_bytes: 2048,
            write_bytes: 512,
            resource_fee: 98_765,
        };
        let encoded = footprint.to_base64().unwrap();
        assert_eq!(ResourceFootprint::from_base64(&encoded).unwrap(), footprint);
        assert!(ResourceFootprint::from_base64("not base64!").is_err());
    }
}
