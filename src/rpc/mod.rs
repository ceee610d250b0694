//! Node RPC access
//!
//! Submits encoded transactions through `broadcast_tx_commit` and reads
//! state back through `abci_query`, using the node's HTTP URI conventions:
//! hex-encoded payloads going out, base64 values coming back.

mod client;
mod config;
mod error;
pub mod response;

pub use client::*;
pub use config::*;
pub use error::*;
