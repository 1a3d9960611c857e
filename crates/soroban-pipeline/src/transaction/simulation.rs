//! Simulation results.
//!
//! A simulation is a dry run against the node's current view of the ledger.
//! Success only means the call looked executable at that ledger; it is an
//! estimate, not a promise.

use crate::api::response::{RestorePreamble, SimulateResponse};
use crate::error::{PipelineError, PipelineResult};
use crate::transaction::classify::{classify_simulation, ErrorCatalog};
use soroban_pipeline_types::{ResourceFootprint, ScValue};
use tracing::debug;

/// Resource estimate of a successful simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    footprint: ResourceFootprint,
    min_resource_fee: i64,
    return_value: Option<ScValue>,
    restore_preamble: Option<RestorePreamble>,
    latest_ledger: u32,
}

impl SimulationResult {
    /// Interprets a `simulateTransaction` response.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SimulationFailed`] if the node reported an
    /// error or sent no resource estimate, and a decoding error if the
    /// estimate is malformed.
    pub fn from_response(response: SimulateResponse, catalog: &ErrorCatalog) -> PipelineResult<Self> {
        if let Some(message) = response.error.as_deref() {
            let err = classify_simulation(message, catalog);
            debug!(latest_ledger = response.latest_ledger, error = %err, "Simulation failed");
            return Err(err);
        }

        let transaction_data = response.transaction_data.as_deref().ok_or_else(|| {
            PipelineError::simulation("node returned no resource estimate")
        })?;
        let footprint = ResourceFootprint::from_base64(transaction_data)?;

        let min_resource_fee = match response.min_resource_fee.as_deref() {
            Some(fee) => fee.trim().parse().map_err(|e| {
                PipelineError::Internal(format!("node sent a non-integer minResourceFee: {e}"))
            })?,
            None => footprint.resource_fee,
        };

        let return_value = response
            .results
            .first()
            .map(|result| result.value())
            .transpose()?;

        debug!(
            latest_ledger = response.latest_ledger,
            instructions = footprint.instructions,
            keys = footprint.key_count(),
            min_resource_fee,
            restore = response.restore_preamble.is_some(),
            "Simulation succeeded"
        );

        Ok(Self {
            footprint,
            min_resource_fee,
            return_value,
            restore_preamble: response.restore_preamble,
            latest_ledger: response.latest_ledger,
        })
    }

    /// The estimated footprint.
    pub fn footprint(&self) -> &ResourceFootprint {
        &self.footprint
    }

    /// The minimum resource fee the node will accept.
    pub fn min_resource_fee(&self) -> i64 {
        self.min_resource_fee
    }

    /// The value the call returned during the dry run.
    pub fn return_value(&self) -> Option<&ScValue> {
        self.return_value.as_ref()
    }

    /// Restore required before the call can run, if any.
    pub fn restore_preamble(&self) -> Option<&RestorePreamble> {
        self.restore_preamble.as_ref()
    }

    /// Returns true if archived entries must be restored first.
    pub fn needs_restore(&self) -> bool {
        self.restore_preamble.is_some()
    }

    /// Ledger the simulation ran against.
    pub fn latest_ledger(&self) -> u32 {
        self.latest_ledger
    }
}
