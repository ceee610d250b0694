//! Configuration module for kvbench
//!
//! Provides hierarchical configuration with support for:
//! - YAML/TOML/JSON config files
//! - Environment variable overrides
//! - Validation

mod run;

pub use run::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{BenchError, BenchResult};
use crate::rpc::ClientConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Target node settings
    pub target: TargetConfig,
    /// Closed-loop (fixed count) workload
    pub load: LoadConfig,
    /// Open-loop (fixed rate) workload
    pub rate: RateConfig,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

impl BenchConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| BenchError::Config(format!("YAML parse error: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| BenchError::Config(format!("TOML parse error: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| BenchError::Config(format!("JSON parse error: {}", e)))?,
            _ => return Err(BenchError::Config(
                "Unsupported config file format. Use .yaml, .toml, or .json".to_string()
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_env() -> BenchResult<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("KVBENCH_ADDR") {
            config.target.addr = addr;
        }

        if let Ok(timeout) = std::env::var("KVBENCH_TIMEOUT") {
            config.target.timeout = parse_duration(&timeout).map_err(BenchError::Config)?;
        }

        if let Ok(prefix) = std::env::var("KVBENCH_PREFIX") {
            config.load.prefix = prefix;
        }

        if let Ok(key) = std::env::var("KVBENCH_COUNTER_KEY") {
            config.rate.key = key;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> BenchResult<()> {
        self.target.validate()?;
        self.load.validate()?;
        self.rate.validate()?;
        Ok(())
    }

    /// Serialize in the given format (yaml, toml, json)
    pub fn render(&self, format: &str) -> BenchResult<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(self)?),
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| BenchError::Config(format!("TOML serialize error: {}", e))),
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| BenchError::Config(format!("YAML serialize error: {}", e))),
            other => Err(BenchError::Config(format!("Unknown config format: {}", other))),
        }
    }
}

/// Target node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// RPC `host:port` of one node
    pub addr: String,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Connection timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            addr: crate::DEFAULT_ADDR.to_string(),
            timeout: crate::DEFAULT_TIMEOUT,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TargetConfig {
    /// Client settings for this target; connect never waits longer than the request
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.addr.clone())
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout.min(self.timeout))
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.addr.trim().is_empty() {
            return Err(BenchError::invalid("target.addr", "addr cannot be empty"));
        }
        if self.timeout.is_zero() {
            return Err(BenchError::invalid("target.timeout", "timeout must be greater than 0"));
        }
        Ok(())
    }
}

/// Closed-loop workload configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Total transactions to send
    pub requests: u64,
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Key prefix so runs don't overwrite each other
    pub prefix: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            requests: 10_000,
            concurrency: 16,
            prefix: "bench".to_string(),
        }
    }
}

impl LoadConfig {
    pub fn validate(&self) -> BenchResult<()> {
        if self.requests == 0 {
            return Err(BenchError::invalid("load.requests", "requests must be greater than 0"));
        }
        if self.concurrency == 0 {
            return Err(BenchError::invalid("load.concurrency", "concurrency must be greater than 0"));
        }
        if self.prefix.is_empty() {
            return Err(BenchError::invalid("load.prefix", "prefix cannot be empty"));
        }
        Ok(())
    }
}

/// Open-loop workload configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Offered transactions per second
    pub tps: u32,
    /// Length of the send phase
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Wait between the last tick and the read-back
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// Key every counter write goes to
    pub key: String,
    /// Seed writes issued before load starts
    pub bootstrap: Vec<SeedAccount>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            tps: 500,
            duration: Duration::from_secs(120),
            cooldown: Duration::from_secs(20),
            key: "acc2".to_string(),
            bootstrap: vec![
                SeedAccount::new("acc1", "10000000"),
                SeedAccount::new("acc2", "0"),
            ],
        }
    }
}

impl RateConfig {
    pub fn validate(&self) -> BenchResult<()> {
        if self.tps == 0 {
            return Err(BenchError::invalid("rate.tps", "tps must be greater than 0"));
        }
        if self.duration.is_zero() {
            return Err(BenchError::invalid("rate.duration", "duration must be greater than 0"));
        }
        if self.key.is_empty() {
            return Err(BenchError::invalid("rate.key", "key cannot be empty"));
        }
        if let Some(seed) = self.bootstrap.iter().find(|s| s.key.is_empty()) {
            return Err(BenchError::invalid(
                "rate.bootstrap",
                format!("seed account with value '{}' has an empty key", seed.value),
            ));
        }
        Ok(())
    }
}

/// A `key=value` write issued once before an open-loop run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    pub key: String,
    pub value: String,
}

impl SeedAccount {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Payload bytes `key=value`
    pub fn payload(&self) -> Vec<u8> {
        format!("{}={}", self.key, self.value).into_bytes()
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Enable telemetry
    pub enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable JSON logging
    pub json_logs: bool,
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
            service_name: "kvbench".to_string(),
        }
    }
}

/// Parse `5s`, `250ms`, `2m` or bare seconds
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Some(millis) = s.strip_suffix("ms") {
        millis.trim().parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| format!("Invalid duration: {}", s))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid duration: {}", s))
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim().parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or_else(|| format!("Invalid duration: {}", s))
    } else {
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid duration: {}", s))
    }
}

/// Helper module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
