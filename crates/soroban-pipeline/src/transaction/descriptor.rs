//! Invocation descriptors and typed result decoding.

use crate::error::{PipelineError, PipelineResult};
use crate::transaction::classify::ErrorCatalog;
use soroban_pipeline_types::{ContractAddress, Operation, ScValue};
use std::fmt;
use std::sync::Arc;

/// A typed decoder for the value a contract call returns.
pub type ResultDecoder<T> = Arc<dyn Fn(&ScValue) -> PipelineResult<T> + Send + Sync>;

/// Conversion from a contract return value.
pub trait FromScValue: Sized {
    /// Decodes `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ResultDecoding`] if the value has another type.
    fn from_sc_value(value: &ScValue) -> PipelineResult<Self>;
}

fn mismatch(expected: &str, value: &ScValue) -> PipelineError {
    PipelineError::ResultDecoding(format!(
        "expected {expected}, contract returned {}",
        value.type_name()
    ))
}

macro_rules! impl_from_sc_value {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FromScValue for $ty {
                fn from_sc_value(value: &ScValue) -> PipelineResult<Self> {
                    match value {
                        ScValue::$variant(v) => Ok(*v),
                        other => Err(mismatch($name, other)),
                    }
                }
            }
        )*
    };
}

impl_from_sc_value! {
    bool => Bool, "bool";
    u32 => U32, "u32";
    i32 => I32, "i32";
    u64 => U64, "u64";
    i64 => I64, "i64";
    u128 => U128, "u128";
    i128 => I128, "i128";
}

impl FromScValue for Vec<u8> {
    fn from_sc_value(value: &ScValue) -> PipelineResult<Self> {
        match value {
            ScValue::Bytes(bytes) => Ok(bytes.clone()),
            other => Err(mismatch("bytes", other)),
        }
    }
}

impl FromScValue for () {
    fn from_sc_value(value: &ScValue) -> PipelineResult<Self> {
        match value {
            ScValue::Void => Ok(()),
            other => Err(mismatch("void", other)),
        }
    }
}

impl FromScValue for String {
    fn from_sc_value(value: &ScValue) -> PipelineResult<Self> {
        match value {
            ScValue::String(s) | ScValue::Symbol(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl FromScValue for ScValue {
    fn from_sc_value(value: &ScValue) -> PipelineResult<Self> {
        Ok(value.clone())
    }
}

/// One contract call: a serialized operation plus the decoder for its result.
///
/// Produced by call-site code and consumed by the pipeline.
///
/// # Example
///
/// ```rust
/// use soroban_pipeline::transaction::InvocationDescriptor;
/// use soroban_pipeline::types::{ContractAddress, ScValue};
///
/// let token = ContractAddress::new([1u8; 32]);
/// let call = InvocationDescriptor::<i128>::invoke(
///     token,
///     "balance",
///     vec![ScValue::symbol("alice")],
/// )
/// .unwrap();
/// assert!(!call.serialized_operation().is_empty());
/// ```
pub struct InvocationDescriptor<T> {
    operation: String,
    decoder: ResultDecoder<T>,
    catalog: Option<ErrorCatalog>,
}

impl<T> Clone for InvocationDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            decoder: Arc::clone(&self.decoder),
            catalog: self.catalog.clone(),
        }
    }
}

impl<T> fmt::Debug for InvocationDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationDescriptor")
            .field("operation", &self.operation)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl<T> InvocationDescriptor<T> {
    /// Creates a descriptor from a base64 operation and a decoder.
    pub fn new<F>(operation: impl Into<String>, decoder: F) -> Self
    where
        F: Fn(&ScValue) -> PipelineResult<T> + Send + Sync + 'static,
    {
        Self {
            operation: operation.into(),
            decoder: Arc::new(decoder),
            catalog: None,
        }
    }

    /// Attaches the error catalog of the called contract.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ErrorCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// The base64 operation payload.
    pub fn serialized_operation(&self) -> &str {
        &self.operation
    }

    /// The error catalog carried by this descriptor.
    pub fn catalog(&self) -> Option<&ErrorCatalog> {
        self.catalog.as_ref()
    }

    /// The result decoder.
    pub fn decoder(&self) -> ResultDecoder<T> {
        Arc::clone(&self.decoder)
    }

    /// Decodes a return value.
    ///
    /// # Errors
    ///
    /// Returns whatever the decoder returns.
    pub fn decode(&self, value: &ScValue) -> PipelineResult<T> {
        (self.decoder)(value)
    }
}

impl<T: FromScValue + 'static> InvocationDescriptor<T> {
    /// Encodes a contract invocation, decoding the result with [`FromScValue`].
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be serialized.
    pub fn invoke(
        contract: ContractAddress,
        function: impl Into<String>,
        args: Vec<ScValue>,
    ) -> PipelineResult<Self> {
        let operation = Operation::invoke(contract, function, args).to_base64()?;
        Ok(Self::typed(operation))
    }

    /// Wraps an already serialized operation, decoding with [`FromScValue`].
    pub fn typed(operation: impl Into<String>) -> Self {
        Self::new(operation, T::from_sc_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sc_value() {
        assert_eq!(u32::from_sc_value(&ScValue::U32(42)).unwrap(), 42);
        assert_eq!(i128::from_sc_value(&ScValue::I128(-5)).unwrap(), -5);
        assert_eq!(
            String::from_sc_value(&ScValue::symbol("ok")).unwrap(),
            "ok"
        );
        <()>::from_sc_value(&ScValue::Void).unwrap();

        let err = u32::from_sc_value(&ScValue::Bool(true)).unwrap_err();
        assert!(matches!(err, PipelineError::ResultDecoding(_)));
        assert!(err.to_string().contains("expected u32"));
    }

    #[test]
    fn test_custom_decoder() {
        let call = InvocationDescriptor::new("AAAA", |value: &ScValue| match value {
            ScValue::U64(v) => Ok(v * 2),
            other => Err(PipelineError::ResultDecoding(other.type_name().into())),
        });
        assert_eq!(call.decode(&ScValue::U64(21)).unwrap(), 42);
        assert!(call.decode(&ScValue::Void).is_err());
    }

    #[test]
    fn test_invoke_round_trips_operation() {
        let contract = ContractAddress::new([3u8; 32]);
        let call =
            InvocationDescriptor::<bool>::invoke(contract, "paused", Vec::new()).unwrap();
        let op = Operation::from_base64(call.serialized_operation()).unwrap();
        assert_eq!(op.name(), "invoke_contract");
        assert!(call.catalog().is_none());
    }
}
