//! Result aggregation
//!
//! Order-independent reductions over per-transaction outcomes: latency
//! percentiles for closed-loop runs and the read-back comparison for
//! open-loop runs.

mod report;

pub use report::*;

use std::time::Duration;

use serde::Serialize;

/// Latency summary over every successful transaction of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    #[serde(serialize_with = "serialize_ms")]
    pub mean: Duration,
    #[serde(serialize_with = "serialize_ms")]
    pub min: Duration,
    #[serde(serialize_with = "serialize_ms")]
    pub max: Duration,
    #[serde(serialize_with = "serialize_ms")]
    pub p50: Duration,
    #[serde(serialize_with = "serialize_ms")]
    pub p95: Duration,
    #[serde(serialize_with = "serialize_ms")]
    pub p99: Duration,
}

impl LatencyStats {
    /// Summarize a set of samples; `None` when there are none
    pub fn from_samples(mut samples: Vec<Duration>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let count = samples.len();
        let total: u128 = samples.iter().map(Duration::as_nanos).sum();
        let mean = Duration::from_nanos((total / count as u128) as u64);

        Some(Self {
            count,
            mean,
            min: samples[0],
            max: samples[count - 1],
            p50: nearest_rank(&samples, 0.50),
            p95: nearest_rank(&samples, 0.95),
            p99: nearest_rank(&samples, 0.99),
        })
    }

    /// `count / mean` in transactions per second.
    ///
    /// Approximate: ignores concurrency and the wall-clock span of the run.
    pub fn approx_throughput(&self) -> f64 {
        let mean = self.mean.as_secs_f64();
        if mean > 0.0 {
            self.count as f64 / mean
        } else {
            0.0
        }
    }
}

/// Sample at index `floor(q × len)` of an ascending slice.
///
/// Panics on an empty slice.
pub fn nearest_rank(sorted: &[Duration], q: f64) -> Duration {
    let idx = (sorted.len() as f64 * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Outcome of comparing the read-back against what an open-loop run sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Committed total covers every counter sent
    Consistent,
    /// Some writes are missing or not yet merged
    Short,
    /// The read-back itself failed
    Unverified,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consistent => write!(f, "consistent"),
            Self::Short => write!(f, "short"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}

/// Read-back comparison for an open-loop run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// Ticks that dispatched a write
    pub sent: u64,
    /// Sum of every counter value written
    pub counter_sum: u64,
    /// Sum of the counters read back (0 if the query failed)
    pub committed: u64,
    /// `tps × duration`
    pub expected_min: u64,
    /// Detached submissions the node acknowledged before read-back
    pub acknowledged: u64,
    /// Detached submissions that failed before read-back
    pub failed: u64,
    /// Query error text, if the read-back failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_error: Option<String>,
}

impl ConsistencyReport {
    pub fn verdict(&self) -> Verdict {
        if self.query_error.is_some() {
            Verdict::Unverified
        } else if self.committed >= self.counter_sum {
            Verdict::Consistent
        } else {
            Verdict::Short
        }
    }

    /// Ticks short of `tps × duration`
    pub fn missed_ticks(&self) -> u64 {
        self.expected_min.saturating_sub(self.sent)
    }
}

fn serialize_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
