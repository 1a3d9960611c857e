//! Footprint and fee assembly.

use crate::error::{PipelineError, PipelineResult};
use soroban_pipeline_types::{ResourceFootprint, TransactionEnvelope};
use tracing::debug;

/// Merges a resource footprint into an envelope and finalizes its fee.
///
/// The attached resource fee is `max(footprint.resource_fee, min_resource_fee)`
/// raised by the configured margin. The total fee is the base fee plus that
/// amount. Re-assembling an already assembled envelope first strips the old
/// resource fee, so assembling twice with the same input gives the same
/// envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Assembler {
    margin_pct: u32,
}

impl Assembler {
    /// Creates an assembler with no fee margin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the resource fee by `percent` percent.
    #[must_use]
    pub fn with_margin(mut self, percent: u32) -> Self {
        self.margin_pct = percent;
        self
    }

    /// The resource fee that will be attached.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow.
    pub fn resource_fee(&self, footprint_fee: i64, min_resource_fee: i64) -> PipelineResult<i64> {
        let floor = footprint_fee.max(min_resource_fee).max(0);
        let inflated = i128::from(floor) * (100 + i128::from(self.margin_pct)) / 100;
        i64::try_from(inflated)
            .map_err(|_| PipelineError::Internal(format!("resource fee overflow: {inflated}")))
    }

    /// Returns a submission-ready copy of `envelope`.
    ///
    /// Any signatures are dropped, since the fee they covered changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee arithmetic overflows.
    pub fn assemble(
        &self,
        envelope: &TransactionEnvelope,
        footprint: &ResourceFootprint,
        min_resource_fee: i64,
    ) -> PipelineResult<TransactionEnvelope> {
        let previous = u64::try_from(envelope.tx.resource_fee()).unwrap_or(0);
        let base_fee = envelope.tx.fee.saturating_sub(previous);
        let resource_fee = self.resource_fee(footprint.resource_fee, min_resource_fee)?;
        let fee = u64::try_from(resource_fee)
            .ok()
            .and_then(|r| base_fee.checked_add(r))
            .ok_or_else(|| PipelineError::Internal("total fee overflow".into()))?;

        let mut tx = envelope.tx.clone();
        tx.fee = fee;
        tx.resources = Some(ResourceFootprint {
            resource_fee,
            ..footprint.clone()
        });

        debug!(
            sequence = tx.sequence,
            base_fee,
            resource_fee,
            total_fee = fee,
            keys = footprint.key_count(),
            "Assembled envelope"
        );
        Ok(TransactionEnvelope::new(tx))
    }
}
