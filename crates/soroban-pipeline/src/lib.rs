//! # Soroban pipeline
//!
//! Issues state-changing and read-only calls against smart contracts behind
//! an asynchronous JSON-RPC node, and manages the rent (TTL) of the ledger
//! entries those contracts use.
//!
//! A call goes through a fixed sequence of stages: build an unsigned
//! envelope, simulate it, assemble the simulated footprint and fee into it,
//! sign it, submit it (retrying while the node asks to try again later), and
//! poll until the transaction reaches a final status. Every failure along the
//! way is classified into one [`PipelineError`] taxonomy, and the caller
//! receives an [`Outcome`](transaction::Outcome).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soroban_pipeline::{ContractPipeline, PipelineConfig};
//! use soroban_pipeline::transaction::{ErrorCatalog, InvocationDescriptor, LocalKeySigner};
//! use std::sync::Arc;
//!
//! let config = PipelineConfig::testnet();
//! let signer = LocalKeySigner::from_hex(&secret, config.network_id())?;
//! let pipeline = ContractPipeline::new(config, signer.account(), Arc::new(signer))?
//!     .with_catalog(ErrorCatalog::new().with(10, "BalanceError"));
//!
//! let call = InvocationDescriptor::<()>::invoke(token, "transfer", args)?;
//! match pipeline.invoke(&call).await {
//!     Outcome::Success { hash, .. } => println!("done: {hash:?}"),
//!     Outcome::Failed(err) => eprintln!("{:?}: {err}", err.kind()),
//!     Outcome::Unknown { hash } => eprintln!("re-poll {hash} later"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - JSON-RPC node client and response types
//! - [`transaction`] - the pipeline stages, signers and outcomes
//! - [`config`] - network presets and tuning
//! - [`retry`] - retry policies for transport errors and submission
//! - [`registry`] - named identifier file used by deployment scripts
//! - [`types`] - the data model, re-exported from `soroban-pipeline-types`

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod transaction;

mod pipeline;

pub use soroban_pipeline_types as types;

pub use config::{Network, PipelineConfig, PoolConfig};
pub use error::{ContractError, ErrorKind, PipelineError, PipelineResult};
pub use pipeline::{ContractPipeline, InvokeOptions};
pub use registry::AddressRegistry;
pub use retry::{RetryConfig, RetryExecutor};
