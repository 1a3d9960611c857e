//! Final outcome of a pipeline call.

use crate::error::{PipelineError, PipelineResult};
use soroban_pipeline_types::Hash32;

/// Coarse status of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// The call succeeded and its result was decoded.
    Success,
    /// The call failed at some stage.
    Failed,
    /// The transaction was submitted but its fate is not known yet.
    Unknown,
}

/// The outcome of one contract call.
///
/// A decoded result exists only on [`Outcome::Success`]. On
/// [`Outcome::Unknown`] the transaction may still finalize: re-poll the hash
/// before resubmitting.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The call succeeded.
    Success {
        /// Hash of the transaction; `None` for read-only calls.
        hash: Option<Hash32>,
        /// The decoded return value.
        value: T,
    },
    /// The call failed.
    Failed(PipelineError),
    /// No final status was observed before the deadline.
    Unknown {
        /// Hash to re-poll.
        hash: Hash32,
    },
}

impl<T> Outcome<T> {
    /// Folds a stage result into an outcome.
    ///
    /// A [`PipelineError::Timeout`] becomes [`Outcome::Unknown`].
    pub fn from_result(hash: Option<Hash32>, result: PipelineResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success { hash, value },
            Err(err) => Self::from_error(err),
        }
    }

    /// Folds a failure into an outcome.
    ///
    /// A [`PipelineError::Timeout`] becomes [`Outcome::Unknown`].
    pub fn from_error(err: PipelineError) -> Self {
        match err {
            PipelineError::Timeout { hash, .. } => Self::Unknown { hash },
            err => Self::Failed(err),
        }
    }

    /// Returns the status.
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Success { .. } => OutcomeStatus::Success,
            Self::Failed(_) => OutcomeStatus::Failed,
            Self::Unknown { .. } => OutcomeStatus::Unknown,
        }
    }

    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The decoded result, present iff the status is success.
    pub fn decoded_result(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The transaction hash, when one was submitted.
    pub fn hash(&self) -> Option<Hash32> {
        match self {
            Self::Success { hash, .. } => *hash,
            Self::Failed(err) => err.tx_hash(),
            Self::Unknown { hash } => Some(*hash),
        }
    }

    /// Converts into a `Result`, mapping `Unknown` back to a timeout error.
    ///
    /// # Errors
    ///
    /// Returns the failure, or [`PipelineError::Timeout`] for an unknown outcome.
    pub fn into_result(self) -> PipelineResult<T> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failed(err) => Err(err),
            Self::Unknown { hash } => Err(PipelineError::Timeout {
                hash,
                waited: std::time::Duration::ZERO,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_success_carries_result() {
        let outcome = Outcome::from_result(Some(Hash32::ZERO), Ok(42u32));
        assert_eq!(outcome.status(), OutcomeStatus::Success);
        assert_eq!(outcome.decoded_result(), Some(&42));
        assert!(outcome.error().is_none());
        assert_eq!(outcome.into_result().unwrap(), 42);
    }

    #[test]
    fn test_timeout_becomes_unknown() {
        let outcome: Outcome<u32> = Outcome::from_result(
            None,
            Err(PipelineError::Timeout {
                hash: Hash32::ZERO,
                waited: Duration::from_secs(30),
            }),
        );
        assert_eq!(outcome.status(), OutcomeStatus::Unknown);
        assert!(outcome.decoded_result().is_none());
        assert_eq!(outcome.hash(), Some(Hash32::ZERO));
        assert!(outcome.into_result().unwrap_err().is_timeout());
    }

    #[test]
    fn test_failure_has_no_result() {
        let outcome: Outcome<u32> =
            Outcome::from_result(None, Err(PipelineError::simulation("trap")));
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert!(outcome.decoded_result().is_none());
        assert!(outcome.error().is_some());
    }
}
