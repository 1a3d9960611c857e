//! The stages of a contract call.
//!
//! Data flows strictly downward:
//!
//! - [`EnvelopeBuilder`] turns an [`InvocationDescriptor`] into an unsigned envelope
//! - [`SimulationResult`] interprets the node's dry run
//! - [`Assembler`] attaches the footprint and finalizes the fee
//! - [`Signer`] signs the assembled envelope
//! - [`Submitter`] sends it, retrying while the node asks to try again
//! - [`FinalityPoller`] waits for the final status and decodes the result
//!
//! [`LifetimeRequest`] enters at the assembly stage with a hand-built
//! footprint instead of a simulated one. The [`classify`] functions turn
//! every node-reported failure into a [`PipelineError`](crate::PipelineError),
//! and [`Outcome`] is what callers finally receive.
//!
//! # Example: driving the stages by hand
//!
//! ```rust,ignore
//! use soroban_pipeline::transaction::*;
//!
//! let builder = EnvelopeBuilder::new(TransactionOptions::new(network_id).timeout(60));
//! let mut cursor = AccountCursor::new(account, client.get_account(&account).await?.sequence()?);
//! let unsigned = builder.build(&mut cursor, call.serialized_operation())?;
//!
//! let simulated = client.simulate_transaction(&unsigned.to_base64()?).await?;
//! let simulation = SimulationResult::from_response(simulated, &catalog)?;
//! let assembled = Assembler::new().assemble(
//!     &unsigned,
//!     simulation.footprint(),
//!     simulation.min_resource_fee(),
//! )?;
//!
//! let signed = signer.sign_envelope(&assembled.to_base64()?).await?;
//! let hash = submitter.submit(&signed, &catalog).await?;
//! let value = poller.wait(hash, |v| call.decode(v), &catalog).await?;
//! ```

pub mod assemble;
pub mod builder;
pub mod classify;
pub mod descriptor;
pub mod lifetime;
pub mod outcome;
pub mod poll;
pub mod signer;
pub mod simulation;
pub mod submit;

pub use assemble::Assembler;
pub use builder::{decode_operation, AccountCursor, EnvelopeBuilder, TransactionOptions};
pub use classify::{
    classify_execution, classify_simulation, classify_submission, parse_contract_code,
    ErrorCatalog,
};
pub use descriptor::{FromScValue, InvocationDescriptor, ResultDecoder};
pub use lifetime::LifetimeRequest;
pub use outcome::{Outcome, OutcomeStatus};
pub use poll::{FinalityPoller, PollOptions};
pub use signer::{FnSigner, LocalKeySigner, Signer};
pub use simulation::SimulationResult;
pub use submit::Submitter;
