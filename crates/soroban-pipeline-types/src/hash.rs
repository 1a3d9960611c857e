//! 32-byte hash value.
//!
//! Used for contract code hashes, identifiers and transaction hashes.

use crate::error::{TypesError, TypesResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// The length of a hash value in bytes.
pub const HASH_LENGTH: usize = 32;

/// A 32-byte hash, displayed as 64 lowercase hex characters.
///
/// # Example
///
/// ```rust
/// use soroban_pipeline_types::Hash32;
///
/// let hash = Hash32::sha256(b"hello world");
/// assert_eq!(hash.to_hex().len(), 64);
///
/// let parsed: Hash32 = hash.to_hex().parse().unwrap();
/// assert_eq!(parsed, hash);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash32([u8; HASH_LENGTH]);

impl Hash32 {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0u8; HASH_LENGTH]);

    /// Creates a hash from a byte array.
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Computes the SHA-256 hash of the given data.
    pub fn sha256<T: AsRef<[u8]>>(data: T) -> Self {
        Self::sha256_of([data])
    }

    /// Computes the SHA-256 hash of several byte slices, in order.
    pub fn sha256_of<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for item in items {
            hasher.update(item.as_ref());
        }
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    /// Parses a hash from 64 hex characters. A `0x` prefix is tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or does not decode to 32 bytes.
    pub fn from_hex<T: AsRef<str>>(hex_str: T) -> TypesResult<Self> {
        let hex_str = hex_str.as_ref();
        let hex_str = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(bytes)
    }

    /// Creates a hash from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 32 bytes long.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> TypesResult<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() != HASH_LENGTH {
            return Err(TypesError::InvalidLength {
                expected: HASH_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut hash = [0u8; HASH_LENGTH];
        hash.copy_from_slice(bytes);
        Ok(Self(hash))
    }

    /// Returns the hash as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the hash as a byte array.
    pub fn to_bytes(&self) -> [u8; HASH_LENGTH] {
        self.0
    }

    /// Returns the hash as lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns true if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl Default for Hash32 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Hash32 {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash32 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            // Fixed-size tuple so the binary form carries no length prefix.
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; HASH_LENGTH]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}

impl From<[u8; HASH_LENGTH]> for Hash32 {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
