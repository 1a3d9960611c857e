//! Ledger keys.
//!
//! A ledger key names one storage entry subject to rent. The same key type is
//! used in simulated footprints and in the hand-built footprints of TTL
//! extension and restoration.

use crate::address::ContractAddress;
use crate::hash::Hash32;
use crate::value::ScValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a persisted data entry survives once its TTL runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Durability {
    /// Deleted when the TTL expires; cannot be restored.
    Temporary,
    /// Archived when the TTL expires; can be restored.
    Persistent,
}

/// A key identifying one rent-bearing ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerKey {
    /// Uploaded contract code, by the hash of its bytes.
    ContractCode {
        /// Hash of the code.
        hash: Hash32,
    },
    /// A deployed contract instance.
    ContractInstance {
        /// Address of the instance.
        contract: ContractAddress,
    },
    /// A persisted key/value record owned by a contract.
    ContractData {
        /// Owning contract.
        contract: ContractAddress,
        /// Storage key.
        key: ScValue,
        /// Storage durability.
        durability: Durability,
    },
}

impl LedgerKey {
    /// Key of uploaded contract code.
    pub fn contract_code(hash: Hash32) -> Self {
        Self::ContractCode { hash }
    }

    /// Key of a contract instance.
    pub fn contract_instance(contract: ContractAddress) -> Self {
        Self::ContractInstance { contract }
    }

    /// Key of a persisted data record.
    pub fn contract_data(contract: ContractAddress, key: ScValue, durability: Durability) -> Self {
        Self::ContractData {
            contract,
            key,
            durability,
        }
    }

    /// Returns true if the entry can be restored after archival.
    ///
    /// Temporary data is deleted, not archived, on expiry.
    pub fn is_restorable(&self) -> bool {
        !matches!(
            self,
            Self::ContractData {
                durability: Durability::Temporary,
                ..
            }
        )
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractCode { hash } => write!(f, "code:{hash}"),
            Self::ContractInstance { contract } => write!(f, "instance:{contract}"),
            Self::ContractData {
                contract,
                key,
                durability,
            } => write!(f, "data:{contract}:{key:?}:{durability:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restorable() {
        let contract = ContractAddress::new([1u8; 32]);
        assert!(LedgerKey::contract_code(Hash32::ZERO).is_restorable());
        assert!(LedgerKey::contract_instance(contract).is_restorable());
        assert!(LedgerKey::contract_data(contract, ScValue::symbol("k"), Durability::Persistent)
            .is_restorable());
        assert!(!LedgerKey::contract_data(contract, ScValue::symbol("k"), Durability::Temporary)
            .is_restorable());
    }

    #[test]
    fn test_display() {
        let key = LedgerKey::contract_code(Hash32::new([0xaa; 32]));
        assert_eq!(key.to_string(), format!("code:{}", "aa".repeat(32)));
    }
}
