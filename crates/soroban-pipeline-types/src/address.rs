//! Account and contract identifiers.
//!
//! Both are 32-byte values. Their textual form is a one-letter kind prefix
//! (`G` for accounts, `C` for contracts) followed by 64 hex characters, so a
//! contract id can never be mistaken for an account id in configuration
//! files or logs.

use crate::error::{TypesError, TypesResult};
use crate::hash::{Hash32, HASH_LENGTH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(Hash32);

        impl $name {
            /// Textual prefix identifying this kind of identifier.
            pub const PREFIX: char = $prefix;

            /// Creates an identifier from raw bytes.
            pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
                Self(Hash32::new(bytes))
            }

            /// Returns the underlying 32 bytes.
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }

            /// Returns the identifier as a hash value.
            pub fn to_hash(&self) -> Hash32 {
                self.0
            }

            /// Parses the prefixed textual form.
            ///
            /// # Errors
            ///
            /// Returns [`TypesError::InvalidAddress`] if the prefix is wrong or the
            /// remainder is not 64 hex characters.
            pub fn parse(s: &str) -> TypesResult<Self> {
                let body = s.strip_prefix($prefix).ok_or_else(|| {
                    TypesError::InvalidAddress(format!(
                        "{} id must start with '{}': {s}",
                        $kind, $prefix
                    ))
                })?;
                let hash = Hash32::from_hex(body).map_err(|e| {
                    TypesError::InvalidAddress(format!("{} id {s}: {e}", $kind))
                })?;
                if body.len() != HASH_LENGTH * 2 {
                    return Err(TypesError::InvalidAddress(format!(
                        "{} id must have 64 hex characters: {s}",
                        $kind
                    )));
                }
                Ok(Self(hash))
            }
        }

        impl From<Hash32> for $name {
            fn from(hash: Hash32) -> Self {
                Self(hash)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_string())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    Self::parse(&s).map_err(serde::de::Error::custom)
                } else {
                    Ok(Self(Hash32::deserialize(deserializer)?))
                }
            }
        }
    };
}

prefixed_id!(
    /// The id of an account that can source transactions (its public key).
    AccountId,
    'G',
    "account"
);

prefixed_id!(
    /// The address of a deployed contract instance.
    ContractAddress,
    'C',
    "contract"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_prefix() {
        let account = AccountId::new([1u8; 32]);
        let contract = ContractAddress::new([1u8; 32]);
        assert!(account.to_string().starts_with('G'));
        assert!(contract.to_string().starts_with('C'));
        assert_eq!(account.to_string().len(), 65);
    }

    #[test]
    fn test_parse_round_trip() {
        let contract = ContractAddress::new([0x5a; 32]);
        let parsed: ContractAddress = contract.to_string().parse().unwrap();
        assert_eq!(parsed, contract);
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let contract = ContractAddress::new([3u8; 32]);
        let err = AccountId::parse(&contract.to_string()).unwrap_err();
        assert!(matches!(err, TypesError::InvalidAddress(_)));
    }

    #[test]
    fn test_short_body_rejected() {
        assert!(ContractAddress::parse("Cabcd").is_err());
        assert!(ContractAddress::parse("C").is_err());
    }

    #[test]
    fn test_json_form() {
        let account = AccountId::new([0xff; 32]);
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, format!("\"G{}\"", "ff".repeat(32)));
    }
}
