//! base64(BCS) encoding shared by every wire-visible type.

use crate::error::TypesResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a value as base64 of its BCS bytes.
///
/// # Errors
///
/// Returns an error if BCS serialization fails.
pub(crate) fn to_base64<T: Serialize>(value: &T) -> TypesResult<String> {
    Ok(base64::encode(bcs::to_bytes(value)?))
}

/// Decodes a value from base64 of its BCS bytes.
///
/// # Errors
///
/// Returns an error if the input is not base64 or the bytes do not decode as `T`.
pub(crate) fn from_base64<T: DeserializeOwned>(encoded: &str) -> TypesResult<T> {
    let bytes = base64::decode(encoded.trim())?;
    Ok(bcs::from_bytes(&bytes)?)
}
