//! Contract values.
//!
//! [`ScValue`] is what crosses the contract boundary: invocation arguments,
//! storage keys of persisted data and the return value of a call.

use crate::address::{AccountId, ContractAddress};
use serde::{Deserialize, Serialize};

/// A value understood by contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScValue {
    /// The unit value.
    Void,
    /// A boolean.
    Bool(bool),
    /// An unsigned 32-bit integer.
    U32(u32),
    /// A signed 32-bit integer.
    I32(i32),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 128-bit integer.
    U128(u128),
    /// A signed 128-bit integer, used for token amounts.
    I128(i128),
    /// A short identifier, e.g. a function or storage key name.
    Symbol(String),
    /// A UTF-8 string.
    String(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
    /// A contract address.
    Address(ContractAddress),
    /// An account id.
    Account(AccountId),
    /// An ordered list.
    Vec(Vec<ScValue>),
    /// An ordered list of key/value pairs.
    Map(Vec<(ScValue, ScValue)>),
}

impl ScValue {
    /// Shorthand for a [`ScValue::Symbol`].
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Returns a short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool(_) => "bool",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::U128(_) => "u128",
            Self::I128(_) => "i128",
            Self::Symbol(_) => "symbol",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Address(_) => "address",
            Self::Account(_) => "account",
            Self::Vec(_) => "vec",
            Self::Map(_) => "map",
        }
    }
}

impl From<bool> for ScValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for ScValue {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<i32> for ScValue {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<u64> for ScValue {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<i64> for ScValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<u128> for ScValue {
    fn from(value: u128) -> Self {
        Self::U128(value)
    }
}

impl From<i128> for ScValue {
    fn from(value: i128) -> Self {
        Self::I128(value)
    }
}

impl From<String> for ScValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ScValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for ScValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<ContractAddress> for ScValue {
    fn from(value: ContractAddress) -> Self {
        Self::Address(value)
    }
}

impl From<AccountId> for ScValue {
    fn from(value: AccountId) -> Self {
        Self::Account(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(ScValue::from(42u32), ScValue::U32(42));
        assert_eq!(ScValue::from(-5i128), ScValue::I128(-5));
        assert_eq!(ScValue::from("hi"), ScValue::String("hi".into()));
        assert_eq!(ScValue::symbol("balance"), ScValue::Symbol("balance".into()));
    }

    #[test]
    fn test_i128_survives_bcs() {
        let value = ScValue::Vec(vec![ScValue::I128(i128::MIN), ScValue::U128(u128::MAX)]);
        let bytes = bcs::to_bytes(&value).unwrap();
        let back: ScValue = bcs::from_bytes(&bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(ScValue::Void.type_name(), "void");
        assert_eq!(ScValue::Map(vec![]).type_name(), "map");
    }
}
