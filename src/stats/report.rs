//! Run reports and their text, JSON and CSV renderings

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{ConsistencyReport, LatencyStats};
use crate::error::{BenchError, BenchResult};

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(BenchError::invalid("format", format!("Unknown report format: {}", other))),
        }
    }
}

/// Summary of a closed-loop run
#[derive(Debug, Clone)]
pub struct ClosedLoopReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub requested: u64,
    pub concurrency: usize,
    pub errors: u64,
    pub elapsed: Duration,
    /// `None` when no transaction succeeded
    pub latency: Option<LatencyStats>,
}

impl ClosedLoopReport {
    pub fn successes(&self) -> usize {
        self.latency.map(|l| l.count).unwrap_or(0)
    }

    /// Successes per second of wall-clock time
    pub fn measured_throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.successes() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn render(&self, format: ReportFormat) -> BenchResult<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
            ReportFormat::Csv => Ok(self.render_csv()),
        }
    }

    fn render_text(&self) -> String {
        let mut out = String::new();
        let Some(latency) = &self.latency else {
            let _ = writeln!(out, "No successful transactions!");
            let _ = writeln!(out, "Errors            : {}", self.errors);
            return out;
        };

        let _ = writeln!(out, "========== Tendermint KVStore Benchmark ==========");
        let _ = writeln!(out, "RPC target        : {}", self.target);
        let _ = writeln!(out, "Total TX          : {}", latency.count);
        let _ = writeln!(out, "Errors            : {}", self.errors);
        let _ = writeln!(out, "Concurrency       : {}", self.concurrency);
        let _ = writeln!(out, "Elapsed           : {:.2?}", self.elapsed);
        let _ = writeln!(out, "Avg latency       : {:?}", latency.mean);
        let _ = writeln!(
            out,
            "p50 / p95 / p99   : {:?} / {:?} / {:?}",
            latency.p50, latency.p95, latency.p99
        );
        let _ = writeln!(out, "Approx throughput : {:.2} tx/sec", latency.approx_throughput());
        let _ = writeln!(out, "Wall throughput   : {:.2} tx/sec", self.measured_throughput());
        out
    }

    fn render_json(&self) -> BenchResult<String> {
        let result = json!({
            "mode": "fixed_count",
            "target": self.target,
            "started_at": self.started_at,
            "requested": self.requested,
            "concurrency": self.concurrency,
            "success": self.successes(),
            "errors": self.errors,
            "duration_secs": self.elapsed.as_secs_f64(),
            "approx_throughput": self.latency.map(|l| l.approx_throughput()),
            "measured_throughput": self.measured_throughput(),
            "latency": self.latency,
        });
        Ok(serde_json::to_string_pretty(&result)?)
    }

    fn render_csv(&self) -> String {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let mut out = String::from(
            "requested,success,errors,concurrency,duration_secs,approx_tps,measured_tps,avg_ms,p50_ms,p95_ms,p99_ms\n",
        );
        match &self.latency {
            Some(l) => {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{:.3},{:.2},{:.2},{:.3},{:.3},{:.3},{:.3}",
                    self.requested,
                    l.count,
                    self.errors,
                    self.concurrency,
                    self.elapsed.as_secs_f64(),
                    l.approx_throughput(),
                    self.measured_throughput(),
                    ms(l.mean),
                    ms(l.p50),
                    ms(l.p95),
                    ms(l.p99),
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{},0,{},{},{:.3},,,,,,",
                    self.requested,
                    self.errors,
                    self.concurrency,
                    self.elapsed.as_secs_f64(),
                );
            }
        }
        out
    }
}

/// Summary of an open-loop run
#[derive(Debug, Clone)]
pub struct OpenLoopReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub tps: u32,
    pub duration: Duration,
    pub key: String,
    pub consistency: ConsistencyReport,
}

impl OpenLoopReport {
    pub fn render(&self, format: ReportFormat) -> BenchResult<String> {
        let c = &self.consistency;
        match format {
            ReportFormat::Text => {
                let mut out = String::new();
                let _ = writeln!(
                    out,
                    "sent={} committed={} expected≥{}",
                    c.sent, c.committed, c.expected_min
                );
                let _ = writeln!(out, "counter sum       : {}", c.counter_sum);
                let _ = writeln!(out, "missed ticks      : {}", c.missed_ticks());
                let _ = writeln!(out, "acknowledged      : {} ({} failed)", c.acknowledged, c.failed);
                if let Some(err) = &c.query_error {
                    let _ = writeln!(out, "read-back error   : {}", err);
                }
                let _ = writeln!(out, "verdict           : {}", c.verdict());
                let _ = writeln!(
                    out,
                    "note: assumes '{}' merges concurrent writes additively",
                    self.key
                );
                Ok(out)
            }
            ReportFormat::Json => {
                let result = json!({
                    "mode": "fixed_rate",
                    "target": self.target,
                    "started_at": self.started_at,
                    "tps": self.tps,
                    "duration_secs": self.duration.as_secs_f64(),
                    "key": self.key,
                    "consistency": c,
                    "missed_ticks": c.missed_ticks(),
                    "verdict": c.verdict(),
                });
                Ok(serde_json::to_string_pretty(&result)?)
            }
            ReportFormat::Csv => Ok(format!(
                "tps,duration_secs,sent,committed,expected_min,missed_ticks,counter_sum,acknowledged,failed,verdict\n{},{},{},{},{},{},{},{},{},{}\n",
                self.tps,
                self.duration.as_secs_f64(),
                c.sent,
                c.committed,
                c.expected_min,
                c.missed_ticks(),
                c.counter_sum,
                c.acknowledged,
                c.failed,
                c.verdict(),
            )),
        }
    }
}
