//! Signers.
//!
//! The pipeline hands the assembled envelope to a [`Signer`] in its base64
//! form and expects the signed form back. How the signature is produced
//! (local key, remote service, hardware wallet, multisig collector) is up to
//! the implementation.

use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use ed25519_dalek::Signer as DalekSigner;
use soroban_pipeline_types::{AccountId, DecoratedSignature, TransactionEnvelope};
use std::fmt;
use std::future::Future;

/// Ed25519 secret key length in bytes.
pub const ED25519_SECRET_KEY_LENGTH: usize = 32;

/// Signs serialized envelopes.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs a base64 envelope and returns the signed base64 envelope.
    ///
    /// # Errors
    ///
    /// Any error aborts the call; the pipeline reports it as
    /// [`PipelineError::SignerDeclined`].
    async fn sign_envelope(&self, envelope_b64: &str) -> PipelineResult<String>;
}

/// Signs with an in-memory ed25519 key.
///
/// # Example
///
/// ```rust
/// use soroban_pipeline::transaction::LocalKeySigner;
///
/// let signer = LocalKeySigner::generate("Test SDF Network ; September 2015");
/// assert!(signer.account().to_string().starts_with('G'));
/// ```
#[derive(Clone)]
pub struct LocalKeySigner {
    key: ed25519_dalek::SigningKey,
    network_id: String,
}

impl LocalKeySigner {
    /// Generates a random key.
    pub fn generate(network_id: impl Into<String>) -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            key: ed25519_dalek::SigningKey::generate(&mut csprng),
            network_id: network_id.into(),
        }
    }

    /// Creates a signer from raw secret key bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not 32 bytes long.
    pub fn from_bytes(bytes: &[u8], network_id: impl Into<String>) -> PipelineResult<Self> {
        let key_bytes: [u8; ED25519_SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            PipelineError::Config(format!(
                "expected {} secret key bytes, got {}",
                ED25519_SECRET_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self {
            key: ed25519_dalek::SigningKey::from_bytes(&key_bytes),
            network_id: network_id.into(),
        })
    }

    /// Creates a signer from a hex secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 64 hex characters.
    pub fn from_hex(hex_str: &str, network_id: impl Into<String>) -> PipelineResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes, network_id)
    }

    /// The account controlled by this key.
    pub fn account(&self) -> AccountId {
        AccountId::new(self.key.verifying_key().to_bytes())
    }

    /// Signs an envelope in place.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SignerDeclined`] if the envelope belongs to
    /// another account.
    pub fn sign(&self, envelope: &mut TransactionEnvelope) -> PipelineResult<()> {
        if envelope.tx.source != self.account() {
            return Err(PipelineError::SignerDeclined(format!(
                "envelope source {} is not {}",
                envelope.tx.source,
                self.account()
            )));
        }
        let hash = envelope.hash(&self.network_id)?;
        let signature = self.key.sign(hash.as_bytes());
        let public_key = self.key.verifying_key().to_bytes();
        envelope.add_signature(DecoratedSignature::new(
            &public_key,
            signature.to_bytes().to_vec(),
        )?);
        Ok(())
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalKeySigner({}, [REDACTED])", self.account())
    }
}

#[async_trait]
impl Signer for LocalKeySigner {
    async fn sign_envelope(&self, envelope_b64: &str) -> PipelineResult<String> {
        let mut envelope = TransactionEnvelope::from_base64(envelope_b64)?;
        self.sign(&mut envelope)?;
        Ok(envelope.to_base64()?)
    }
}

/// Adapts an async closure into a [`Signer`].
///
/// Useful for remote signers and for tests.
pub struct FnSigner<F> {
    sign: F,
}

impl<F> FnSigner<F> {
    /// Wraps `sign`.
    pub fn new(sign: F) -> Self {
        Self { sign }
    }
}

impl<F> fmt::Debug for FnSigner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSigner").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Signer for FnSigner<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PipelineResult<String>> + Send + 'static,
{
    async fn sign_envelope(&self, envelope_b64: &str) -> PipelineResult<String> {
        (self.sign)(envelope_b64.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;
    use soroban_pipeline_types::{ContractAddress, Operation, TimeBounds, Transaction};

    const NETWORK: &str = "Test Network";

    fn envelope_for(source: AccountId) -> TransactionEnvelope {
        TransactionEnvelope::new(Transaction {
            source,
            fee: 100,
            sequence: 1,
            time_bounds: TimeBounds::UNBOUNDED,
            operation: Operation::invoke(ContractAddress::new([5u8; 32]), "ping", Vec::new()),
            resources: None,
        })
    }

    #[tokio::test]
    async fn test_local_signer_signs_hash() {
        let signer = LocalKeySigner::from_bytes(&[7u8; 32], NETWORK).unwrap();
        let envelope = envelope_for(signer.account());
        let signed_b64 = signer
            .sign_envelope(&envelope.to_base64().unwrap())
            .await
            .unwrap();
        let signed = TransactionEnvelope::from_base64(&signed_b64).unwrap();
        assert_eq!(signed.signatures.len(), 1);
        assert_eq!(signed.tx, envelope.tx);

        let decorated = &signed.signatures[0];
        assert_eq!(&decorated.hint[..], &signer.account().as_bytes()[28..]);
        let signature =
            ed25519_dalek::Signature::from_slice(&decorated.signature).unwrap();
        let hash = envelope.hash(NETWORK).unwrap();
        signer
            .key
            .verifying_key()
            .verify(hash.as_bytes(), &signature)
            .unwrap();
    }

    #[tokio::test]
    async fn test_local_signer_rejects_foreign_source() {
        let signer = LocalKeySigner::generate(NETWORK);
        let envelope = envelope_for(AccountId::new([1u8; 32]));
        let err = signer
            .sign_envelope(&envelope.to_base64().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::SignerDeclined(_)));
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(LocalKeySigner::from_bytes(&[0u8; 31], NETWORK).is_err());
        assert!(LocalKeySigner::from_hex(&"11".repeat(32), NETWORK).is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let signer = LocalKeySigner::from_bytes(&[7u8; 32], NETWORK).unwrap();
        let debug = format!("{signer:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex::encode([7u8; 32])));
    }

    #[tokio::test]
    async fn test_fn_signer() {
        let signer = FnSigner::new(|envelope: String| async move {
            Ok::<_, PipelineError>(format!("{envelope}!"))
        });
        assert_eq!(signer.sign_envelope("abc").await.unwrap(), "abc!");
    }
}
