//! # Soroban pipeline types
//!
//! The data model shared by every stage of the transaction pipeline: hashes,
//! account and contract identifiers, contract values, ledger keys, resource
//! footprints, operations and transaction envelopes.
//!
//! Nothing in this crate performs I/O. Every wire-visible type serializes to
//! BCS, and envelopes, operations and footprints travel as base64 of those
//! bytes.
//!
//! ```rust
//! use soroban_pipeline_types::{Hash32, LedgerKey, ResourceFootprint};
//!
//! let key = LedgerKey::contract_code(Hash32::sha256(b"wasm"));
//! let footprint = ResourceFootprint::for_extend_ttl(key.clone(), 0);
//! assert_eq!(footprint.read_only, vec![key]);
//! assert!(footprint.read_write.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

mod codec;

pub mod address;
pub mod error;
pub mod footprint;
pub mod hash;
pub mod ledger_key;
pub mod operation;
pub mod transaction;
pub mod value;

pub use address::{AccountId, ContractAddress};
pub use error::{TypesError, TypesResult};
pub use footprint::ResourceFootprint;
pub use hash::{Hash32, HASH_LENGTH};
pub use ledger_key::{Durability, LedgerKey};
pub use operation::Operation;
pub use transaction::{DecoratedSignature, TimeBounds, Transaction, TransactionEnvelope};
pub use value::ScValue;
