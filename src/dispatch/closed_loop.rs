//! Closed-loop dispatcher: fixed count, bounded concurrency

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use super::{ClosedLoopPhase, DispatchCounter};
use crate::config::{RunConfig, Workload};
use crate::encoder::Transaction;
use crate::error::{BenchError, BenchResult};
use crate::rpc::TxEndpoint;
use crate::stats::LatencyStats;

/// Raw outcome of a closed-loop run
#[derive(Debug, Clone)]
pub struct ClosedLoopOutcome {
    /// One latency per committed transaction, in completion order
    pub samples: Vec<Duration>,
    /// Transactions that failed
    pub errors: u64,
    /// Indices handed out to workers
    pub claimed: u64,
    /// Wall-clock time from first spawn to last worker joined
    pub elapsed: Duration,
}

impl ClosedLoopOutcome {
    pub fn successes(&self) -> usize {
        self.samples.len()
    }

    /// Latency summary; `None` if nothing succeeded
    pub fn stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(self.samples.clone())
    }
}

/// Pull-based worker pool submitting `total` indexed transactions
pub struct ClosedLoop<E> {
    endpoint: Arc<E>,
    prefix: Arc<str>,
    total: u64,
    concurrency: usize,
}

impl<E: TxEndpoint> ClosedLoop<E> {
    pub fn new(endpoint: Arc<E>, prefix: impl Into<String>, total: u64, concurrency: usize) -> Self {
        Self {
            endpoint,
            prefix: Arc::from(prefix.into()),
            total,
            concurrency: concurrency.max(1),
        }
    }

    /// Dispatcher for a fixed-count run
    pub fn from_run(endpoint: Arc<E>, run: &RunConfig) -> BenchResult<Self> {
        match &run.workload {
            Workload::FixedCount { total, concurrency } => {
                Ok(Self::new(endpoint, run.prefix.clone(), *total, *concurrency))
            }
            Workload::FixedRate { .. } => Err(BenchError::Config(
                "closed-loop dispatch needs a fixed-count workload".to_string(),
            )),
        }
    }

    /// Run every worker to completion and collect their samples
    pub async fn run(self) -> BenchResult<ClosedLoopOutcome> {
        let counter = Arc::new(DispatchCounter::new(self.total));
        let errors = Arc::new(AtomicU64::new(0));
        let (sample_tx, mut sample_rx) = mpsc::unbounded_channel();

        transition(ClosedLoopPhase::Idle);
        info!(total = self.total, concurrency = self.concurrency, "Starting closed-loop run");
        let start = Instant::now();

        transition(ClosedLoopPhase::Running);
        let mut workers = JoinSet::new();
        for id in 0..self.concurrency {
            let worker = Worker {
                id,
                endpoint: self.endpoint.clone(),
                counter: counter.clone(),
                prefix: self.prefix.clone(),
                samples: sample_tx.clone(),
                errors: errors.clone(),
            };
            workers.spawn(worker.run().instrument(info_span!("worker", id)));
        }
        // Only worker-held senders remain, so the channel closes once the
        // last worker exits.
        drop(sample_tx);

        let mut samples = Vec::with_capacity(self.total.min(1 << 20) as usize);
        while let Some(sample) = sample_rx.recv().await {
            samples.push(sample);
        }

        transition(ClosedLoopPhase::Draining);
        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        let elapsed = start.elapsed();
        transition(ClosedLoopPhase::Done);

        Ok(ClosedLoopOutcome {
            samples,
            errors: errors.load(Ordering::Relaxed),
            claimed: counter.claimed(),
            elapsed,
        })
    }
}

struct Worker<E> {
    id: usize,
    endpoint: Arc<E>,
    counter: Arc<DispatchCounter>,
    prefix: Arc<str>,
    samples: mpsc::UnboundedSender<Duration>,
    errors: Arc<AtomicU64>,
}

impl<E: TxEndpoint> Worker<E> {
    async fn run(self) {
        let mut submitted = 0u64;

        while let Some(index) = self.counter.claim() {
            let tx = Transaction::indexed(&self.prefix, index);
            let started = Instant::now();

            match self.endpoint.submit(&tx).await {
                Ok(_) => {
                    let _ = self.samples.send(started.elapsed());
                }
                Err(e) => {
                    self.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = self.id, index, kind = e.kind(), error = %e, "tx failed");
                }
            }
            submitted += 1;
        }

        debug!(worker = self.id, submitted, "Worker drained");
    }
}

fn transition(phase: ClosedLoopPhase) {
    info!(%phase, "Closed-loop phase");
}
