//! # kvbench
//!
//! Load generator and consistency checker for Tendermint-style
//! transaction RPC endpoints.
//!
//! ## Features
//!
//! - **Closed-loop load**: a fixed number of transactions pushed through a
//!   fixed pool of workers, with mean/p50/p95/p99 commit latency
//! - **Open-loop load**: writes offered at a fixed rate for a fixed duration,
//!   followed by a read-back that checks the committed counter total
//! - **Wire-compatible**: hex-encoded `broadcast_tx_commit` submissions and
//!   base64 `abci_query` read-back, exactly as the node serves them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kvbench::{ClosedLoop, RpcClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(RpcClient::new("127.0.0.1:26657")?);
//!     let outcome = ClosedLoop::new(client, "bench", 1_000, 16).run().await?;
//!
//!     match outcome.stats() {
//!         Some(stats) => println!("p99 = {:?}", stats.p99),
//!         None => println!("No successful transactions!"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod rpc;
pub mod stats;
pub mod telemetry;

use std::time::Duration;

pub use config::{BenchConfig, RunConfig, Workload};
pub use dispatch::{ClosedLoop, OpenLoop};
pub use encoder::Transaction;
pub use error::{BenchError, BenchResult};
pub use rpc::{RpcClient, RpcError, TxEndpoint};
pub use stats::{ConsistencyReport, LatencyStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default node RPC address
pub const DEFAULT_ADDR: &str = "127.0.0.1:26657";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
