//! CLI Module for kvbench
//!
//! Provides a command-line interface with subcommands for:
//! - Closed-loop (fixed count) load runs
//! - Open-loop (fixed rate) load runs with read-back verification
//! - One-off state queries
//! - Managing configuration

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{parse_duration, BenchConfig, TelemetryConfig};
use crate::VERSION;

/// kvbench: load generator for Tendermint-style transaction endpoints
#[derive(Parser, Debug)]
#[command(name = "kvbench")]
#[command(version = VERSION)]
#[command(about = "Load generator and consistency checker for Tendermint-style RPC endpoints")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration file path (YAML, TOML, or JSON)
    #[arg(short = 'C', long, global = true, env = "KVBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "KVBENCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Enable JSON log output; overrides the config file
    #[arg(long, global = true, env = "KVBENCH_JSON_LOGS")]
    pub json_logs: bool,

    /// Quiet mode - suppress progress lines on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply global logging flags; unset flags leave the file/env values alone
    pub fn apply_telemetry(&self, telemetry: &mut TelemetryConfig) {
        if let Some(level) = &self.log_level {
            telemetry.log_level = level.clone();
        }
        if self.json_logs {
            telemetry.json_logs = true;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a fixed number of transactions through a fixed worker pool
    #[command(alias = "bench")]
    Load(LoadCommand),

    /// Offer transactions at a fixed rate, then verify the committed total
    #[command(alias = "tps")]
    Rate(RateCommand),

    /// Read a key back from the node
    Query(QueryCommand),

    /// Configuration management
    #[command(alias = "cfg")]
    Config(ConfigCommand),

    /// Show version and build information
    Version,
}

/// Closed-loop run
#[derive(Parser, Debug)]
pub struct LoadCommand {
    /// RPC host:port of one node
    #[arg(short, long, env = "KVBENCH_ADDR")]
    pub addr: Option<String>,

    /// Total number of transactions to send
    #[arg(short = 'n', long)]
    pub requests: Option<u64>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Key prefix so multiple runs don't overwrite each other
    #[arg(short, long, env = "KVBENCH_PREFIX")]
    pub prefix: Option<String>,

    /// Per-request timeout (e.g. 5s, 500ms)
    #[arg(short, long, env = "KVBENCH_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format (text, json, csv)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

impl LoadCommand {
    /// Apply command-line overrides on top of file/env configuration
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(addr) = &self.addr {
            config.target.addr = addr.clone();
        }
        if let Some(timeout) = self.timeout {
            config.target.timeout = timeout;
        }
        if let Some(requests) = self.requests {
            config.load.requests = requests;
        }
        if let Some(concurrency) = self.concurrency {
            config.load.concurrency = concurrency;
        }
        if let Some(prefix) = &self.prefix {
            config.load.prefix = prefix.clone();
        }
    }
}

/// Open-loop run
#[derive(Parser, Debug)]
pub struct RateCommand {
    /// RPC host:port of one node
    #[arg(short, long, env = "KVBENCH_ADDR")]
    pub addr: Option<String>,

    /// Offered transactions per second
    #[arg(long, alias = "rate")]
    pub tps: Option<u32>,

    /// Length of the send phase (bare numbers are seconds)
    #[arg(long = "sec", alias = "duration", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Wait before reading the counter back
    #[arg(long, value_parser = parse_duration)]
    pub cooldown: Option<Duration>,

    /// Key the counter writes accumulate under
    #[arg(short, long, env = "KVBENCH_COUNTER_KEY")]
    pub key: Option<String>,

    /// Skip the seed writes before load starts
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Per-request timeout (e.g. 5s, 500ms)
    #[arg(short, long, env = "KVBENCH_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format (text, json, csv)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

impl RateCommand {
    /// Apply command-line overrides on top of file/env configuration
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(addr) = &self.addr {
            config.target.addr = addr.clone();
        }
        if let Some(timeout) = self.timeout {
            config.target.timeout = timeout;
        }
        if let Some(tps) = self.tps {
            config.rate.tps = tps;
        }
        if let Some(duration) = self.duration {
            config.rate.duration = duration;
        }
        if let Some(cooldown) = self.cooldown {
            config.rate.cooldown = cooldown;
        }
        if let Some(key) = &self.key {
            config.rate.key = key.clone();
        }
        if self.no_bootstrap {
            config.rate.bootstrap.clear();
        }
    }
}

/// Read a key back from the node
#[derive(Parser, Debug)]
pub struct QueryCommand {
    /// Key to read
    pub key: String,

    /// RPC host:port of one node
    #[arg(short, long, env = "KVBENCH_ADDR")]
    pub addr: Option<String>,

    /// Decode the value as little-endian u64 counters and sum them
    #[arg(long)]
    pub counters: bool,

    /// Per-request timeout (e.g. 5s, 500ms)
    #[arg(short, long, env = "KVBENCH_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

/// Configuration management
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (yaml, toml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Initialize a new configuration file
    Init {
        /// Output file path (format follows the extension)
        #[arg(short, long, default_value = "kvbench.yaml")]
        output: PathBuf,

        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show environment variable mappings
    Env,
}
