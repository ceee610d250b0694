//! Load dispatch
//!
//! Two ways of offering load to a [`TxEndpoint`](crate::rpc::TxEndpoint):
//!
//! - [`ClosedLoop`]: a fixed pool of workers pulling indices from a shared
//!   counter, each issuing its next transaction only after the previous one
//!   completes. Throughput is bounded by concurrency.
//! - [`OpenLoop`]: a ticker firing at the offered rate, spawning a detached
//!   submission on every tick regardless of how many are still in flight,
//!   followed by a read-back of the accumulated counter.

mod closed_loop;
mod open_loop;

pub use closed_loop::*;
pub use open_loop::*;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out transaction indices `0..total`, each exactly once.
///
/// The single fetch-and-add in [`claim`](Self::claim) is the only point of
/// synchronization between closed-loop workers.
#[derive(Debug)]
pub struct DispatchCounter {
    next: AtomicU64,
    total: u64,
}

impl DispatchCounter {
    pub fn new(total: u64) -> Self {
        Self {
            next: AtomicU64::new(0),
            total,
        }
    }

    /// Claim the next unclaimed index, or `None` once all are taken
    pub fn claim(&self) -> Option<u64> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.total).then_some(index)
    }

    /// Number of indices handed out so far
    pub fn claimed(&self) -> u64 {
        self.next.load(Ordering::Relaxed).min(self.total)
    }
}

/// Lifecycle of a closed-loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedLoopPhase {
    Idle,
    Running,
    Draining,
    Done,
}

impl fmt::Display for ClosedLoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Draining => write!(f, "draining"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Lifecycle of an open-loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenLoopPhase {
    Bootstrap,
    Running,
    Cooldown,
    Verify,
    Done,
}

impl fmt::Display for OpenLoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::Running => write!(f, "running"),
            Self::Cooldown => write!(f, "cooldown"),
            Self::Verify => write!(f, "verify"),
            Self::Done => write!(f, "done"),
        }
    }
}
