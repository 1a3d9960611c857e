//! Node client.
//!
//! - [`RpcClient`] - JSON-RPC client for the contract node
//! - [`response`] - typed results of the node methods

pub mod response;
mod rpc;

pub use response::{
    AccountInfo, GetTransactionResponse, LatestLedger, NetworkInfo, RestorePreamble, SendResponse,
    SendStatus, SimulateHostResult, SimulateResponse, TxStatus,
};
pub use rpc::RpcClient;
