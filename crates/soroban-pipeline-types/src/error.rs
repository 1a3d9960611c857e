//! Error type for the data model.

use thiserror::Error;

/// A specialized Result type for data-model operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised while parsing or (de)serializing data-model values.
#[derive(Error, Debug)]
pub enum TypesError {
    /// A hex string could not be decoded
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A base64 string could not be decoded
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Binary (BCS) encoding or decoding failed
    #[error("BCS error: {0}")]
    Bcs(#[from] bcs::Error),

    /// A hash had the wrong length
    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected number of bytes
        expected: usize,
        /// Number of bytes actually supplied
        actual: usize,
    },

    /// An account or contract identifier could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
