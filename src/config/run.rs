//! Immutable per-run snapshot

use std::time::Duration;

use serde::Serialize;

use super::{BenchConfig, SeedAccount, TargetConfig};
use crate::error::{BenchError, BenchResult};
use crate::rpc::ClientConfig;

/// The work a run performs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Workload {
    /// Closed loop: `total` transactions through `concurrency` workers
    FixedCount { total: u64, concurrency: usize },
    /// Open loop: `tps` ticks per second for `duration`, then verify
    FixedRate {
        tps: u32,
        #[serde(serialize_with = "serialize_secs")]
        duration: Duration,
        #[serde(serialize_with = "serialize_secs")]
        cooldown: Duration,
        key: String,
        bootstrap: Vec<SeedAccount>,
    },
}

impl Workload {
    /// Closed-loop workload from the `load` section
    pub fn fixed_count(config: &BenchConfig) -> Self {
        Workload::FixedCount {
            total: config.load.requests,
            concurrency: config.load.concurrency,
        }
    }

    /// Open-loop workload from the `rate` section
    pub fn fixed_rate(config: &BenchConfig) -> Self {
        Workload::FixedRate {
            tps: config.rate.tps,
            duration: config.rate.duration,
            cooldown: config.rate.cooldown,
            key: config.rate.key.clone(),
            bootstrap: config.rate.bootstrap.clone(),
        }
    }
}

/// Everything a run needs, fixed at startup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// RPC `host:port`
    pub addr: String,
    /// Per-request timeout
    #[serde(serialize_with = "serialize_secs")]
    pub timeout: Duration,
    /// Connection timeout
    #[serde(skip)]
    pub connect_timeout: Duration,
    /// Key prefix for indexed writes
    pub prefix: String,
    pub workload: Workload,
}

impl RunConfig {
    /// Snapshot `config` with the given workload, validating the result
    pub fn new(config: &BenchConfig, workload: Workload) -> BenchResult<Self> {
        let run = Self {
            addr: config.target.addr.clone(),
            timeout: config.target.timeout,
            connect_timeout: config.target.connect_timeout,
            prefix: config.load.prefix.clone(),
            workload,
        };
        run.validate()?;
        Ok(run)
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.addr.trim().is_empty() {
            return Err(BenchError::invalid("addr", "addr cannot be empty"));
        }
        if self.timeout.is_zero() {
            return Err(BenchError::invalid("timeout", "timeout must be greater than 0"));
        }
        match &self.workload {
            Workload::FixedCount { total, concurrency } => {
                if *total == 0 {
                    return Err(BenchError::invalid("requests", "requests must be greater than 0"));
                }
                if *concurrency == 0 {
                    return Err(BenchError::invalid("concurrency", "concurrency must be greater than 0"));
                }
                if self.prefix.is_empty() {
                    return Err(BenchError::invalid("prefix", "prefix cannot be empty"));
                }
            }
            Workload::FixedRate { tps, duration, key, .. } => {
                if *tps == 0 {
                    return Err(BenchError::invalid("tps", "tps must be greater than 0"));
                }
                if duration.is_zero() {
                    return Err(BenchError::invalid("duration", "duration must be greater than 0"));
                }
                if key.is_empty() {
                    return Err(BenchError::invalid("key", "key cannot be empty"));
                }
            }
        }
        Ok(())
    }

    /// Client configuration for this run's target
    pub fn client_config(&self) -> ClientConfig {
        TargetConfig {
            addr: self.addr.clone(),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        }
        .client_config()
    }
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}
