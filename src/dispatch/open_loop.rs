//! Open-loop dispatcher: fixed rate over a fixed duration, then verify

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::OpenLoopPhase;
use crate::config::{RunConfig, SeedAccount, Workload};
use crate::encoder::{sum_counters, Transaction};
use crate::error::{BenchError, BenchResult};
use crate::rpc::TxEndpoint;
use crate::stats::ConsistencyReport;

/// Completion counts of the detached submissions
#[derive(Debug, Default)]
struct Completions {
    acknowledged: AtomicU64,
    failed: AtomicU64,
}

/// Rate-driven writer of an accumulating counter key
pub struct OpenLoop<E> {
    endpoint: Arc<E>,
    tps: u32,
    duration: Duration,
    cooldown: Duration,
    key: Arc<str>,
    bootstrap: Vec<SeedAccount>,
}

impl<E: TxEndpoint> OpenLoop<E> {
    pub fn new(endpoint: Arc<E>, tps: u32, duration: Duration, key: impl Into<String>) -> Self {
        Self {
            endpoint,
            tps: tps.max(1),
            duration,
            cooldown: Duration::ZERO,
            key: Arc::from(key.into()),
            bootstrap: Vec::new(),
        }
    }

    /// Dispatcher for a fixed-rate run
    pub fn from_run(endpoint: Arc<E>, run: &RunConfig) -> BenchResult<Self> {
        match &run.workload {
            Workload::FixedRate { tps, duration, cooldown, key, bootstrap } => {
                Ok(Self::new(endpoint, *tps, *duration, key.clone())
                    .cooldown(*cooldown)
                    .bootstrap(bootstrap.clone()))
            }
            Workload::FixedCount { .. } => Err(BenchError::Config(
                "open-loop dispatch needs a fixed-rate workload".to_string(),
            )),
        }
    }

    /// Wait between the end of sending and the read-back
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Seed writes issued before the first tick
    pub fn bootstrap(mut self, seeds: Vec<SeedAccount>) -> Self {
        self.bootstrap = seeds;
        self
    }

    /// Interval between ticks
    pub fn period(&self) -> Duration {
        (Duration::from_secs(1) / self.tps).max(Duration::from_nanos(1))
    }

    /// `tps × duration`
    pub fn expected_ticks(&self) -> u64 {
        (self.tps as f64 * self.duration.as_secs_f64()).floor() as u64
    }

    /// Bootstrap, send until the deadline, cool down, then read back
    pub async fn run(self) -> ConsistencyReport {
        transition(OpenLoopPhase::Bootstrap);
        for seed in &self.bootstrap {
            let tx = Transaction::from_bytes(seed.payload());
            if let Err(e) = self.endpoint.submit(&tx).await {
                debug!(key = %seed.key, error = %e, "Seed write failed");
            }
        }

        transition(OpenLoopPhase::Running);
        info!(tps = self.tps, duration_secs = self.duration.as_secs_f64(), "Starting open-loop run");

        let completions = Arc::new(Completions::default());
        let start = Instant::now();
        let mut ticker = interval_at(start, self.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let deadline = sleep_until(start + self.duration);
        tokio::pin!(deadline);

        let mut sent = 0u64;
        let mut counter_sum = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => break,
                _ = ticker.tick() => {
                    sent += 1;
                    counter_sum = counter_sum.saturating_add(sent);
                    self.spawn_submit(Transaction::counter(&self.key, sent), completions.clone());
                }
            }
        }
        info!(sent, elapsed_secs = start.elapsed().as_secs_f64(), "Send phase finished");

        transition(OpenLoopPhase::Cooldown);
        sleep(self.cooldown).await;

        transition(OpenLoopPhase::Verify);
        let (committed, query_error) = match self.endpoint.query(&self.key).await {
            Ok(value) => (sum_counters(&value), None),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Read-back failed");
                (0, Some(e.to_string()))
            }
        };

        transition(OpenLoopPhase::Done);
        ConsistencyReport {
            sent,
            counter_sum,
            committed,
            expected_min: self.expected_ticks(),
            acknowledged: completions.acknowledged.load(Ordering::Relaxed),
            failed: completions.failed.load(Ordering::Relaxed),
            query_error,
        }
    }

    /// Fire a submission without waiting for it
    fn spawn_submit(&self, tx: Transaction, completions: Arc<Completions>) {
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            match endpoint.submit(&tx).await {
                Ok(_) => {
                    completions.acknowledged.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    completions.failed.fetch_add(1, Ordering::Relaxed);
                    debug!(error = %e, "Detached submission failed");
                }
            }
        });
    }
}

fn transition(phase: OpenLoopPhase) {
    info!(%phase, "Open-loop phase");
}
