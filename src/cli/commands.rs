//! CLI Command Implementations
//!
//! Implementations for all CLI subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use crate::config::{BenchConfig, RunConfig, Workload};
use crate::dispatch::{ClosedLoop, OpenLoop};
use crate::encoder::decode_counters;
use crate::rpc::{RpcClient, TxEndpoint};
use crate::stats::{ClosedLoopReport, OpenLoopReport, ReportFormat};
use crate::telemetry::{init_telemetry, log_run_end, log_run_start};
use crate::VERSION;

use super::{Cli, Commands, ConfigAction, ConfigCommand, LoadCommand, QueryCommand, RateCommand};

/// Execute the CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    // Load base configuration
    let mut config = if let Some(path) = &cli.config {
        BenchConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?
    } else {
        BenchConfig::from_env()?
    };

    // Apply global settings
    cli.apply_telemetry(&mut config.telemetry);

    match cli.command {
        Commands::Load(cmd) => execute_load(cmd, config, cli.quiet).await,
        Commands::Rate(cmd) => execute_rate(cmd, config, cli.quiet).await,
        Commands::Query(cmd) => execute_query(cmd, config).await,
        Commands::Config(cmd) => execute_config(cmd, config),
        Commands::Version => execute_version(),
    }
}

/// Execute the load command
async fn execute_load(cmd: LoadCommand, mut config: BenchConfig, quiet: bool) -> Result<()> {
    cmd.apply(&mut config);
    let format: ReportFormat = cmd.format.parse()?;
    let run = RunConfig::new(&config, Workload::fixed_count(&config))?;
    init_telemetry(&config.telemetry)?;

    let client = Arc::new(RpcClient::with_config(run.client_config())?);
    let dispatcher = ClosedLoop::from_run(client, &run)?;

    if !quiet {
        eprintln!(
            "Sending {} transactions to {} with {} workers (prefix '{}')",
            config.load.requests, run.addr, config.load.concurrency, run.prefix
        );
    }

    log_run_start("fixed_count", &run.addr);
    let started_at = Utc::now();
    let outcome = dispatcher.run().await?;
    log_run_end("fixed_count", outcome.elapsed, outcome.successes() as u64, outcome.errors);

    let report = ClosedLoopReport {
        target: run.addr.clone(),
        started_at,
        requested: config.load.requests,
        concurrency: config.load.concurrency,
        errors: outcome.errors,
        elapsed: outcome.elapsed,
        latency: outcome.stats(),
    };
    print!("{}", report.render(format)?);

    Ok(())
}

/// Execute the rate command
async fn execute_rate(cmd: RateCommand, mut config: BenchConfig, quiet: bool) -> Result<()> {
    cmd.apply(&mut config);
    let format: ReportFormat = cmd.format.parse()?;
    let run = RunConfig::new(&config, Workload::fixed_rate(&config))?;
    init_telemetry(&config.telemetry)?;

    let client = Arc::new(RpcClient::with_config(run.client_config())?);
    let dispatcher = OpenLoop::from_run(client, &run)?;

    if !quiet {
        eprintln!(
            "sending {} TPS for {:?} to {}, then reading '{}' back after {:?}",
            config.rate.tps, config.rate.duration, run.addr, config.rate.key, config.rate.cooldown
        );
    }

    log_run_start("fixed_rate", &run.addr);
    let started_at = Utc::now();
    let consistency = dispatcher.run().await;
    log_run_end(
        "fixed_rate",
        config.rate.duration + config.rate.cooldown,
        consistency.acknowledged,
        consistency.failed,
    );

    let report = OpenLoopReport {
        target: run.addr.clone(),
        started_at,
        tps: config.rate.tps,
        duration: config.rate.duration,
        key: config.rate.key.clone(),
        consistency,
    };
    print!("{}", report.render(format)?);

    Ok(())
}

/// Execute the query command
async fn execute_query(cmd: QueryCommand, mut config: BenchConfig) -> Result<()> {
    if let Some(addr) = cmd.addr {
        config.target.addr = addr;
    }
    if let Some(timeout) = cmd.timeout {
        config.target.timeout = timeout;
    }
    config.target.validate()?;
    init_telemetry(&config.telemetry)?;

    let client = RpcClient::with_config(config.target.client_config())?;

    let value = client
        .query(&cmd.key)
        .await
        .with_context(|| format!("Query for '{}' failed", cmd.key))?;

    if cmd.counters {
        let counters = decode_counters(&value);
        let total = counters.iter().fold(0u64, |acc, c| acc.saturating_add(*c));
        println!("key       : {}", cmd.key);
        println!("counters  : {}", counters.len());
        println!("sum       : {}", total);
        if value.len() % crate::encoder::COUNTER_WIDTH != 0 {
            println!("trailing  : {} bytes ignored", value.len() % crate::encoder::COUNTER_WIDTH);
        }
    } else {
        println!("key       : {}", cmd.key);
        println!("bytes     : {}", value.len());
        println!("hex       : {}", hex::encode(&value));
        println!("text      : {}", String::from_utf8_lossy(&value));
    }

    Ok(())
}

/// Execute the config command
fn execute_config(cmd: ConfigCommand, config: BenchConfig) -> Result<()> {
    match cmd.action {
        ConfigAction::Show { format } => {
            println!("{}", config.render(&format)?);
            Ok(())
        }

        ConfigAction::Validate { file } => {
            let config = BenchConfig::from_file(&file)?;
            println!("Configuration at {:?} is valid", file);
            println!("  Target:    {} (timeout {:?})", config.target.addr, config.target.timeout);
            println!("  Load:      {} requests, {} workers", config.load.requests, config.load.concurrency);
            println!("  Rate:      {} tx/s for {:?}", config.rate.tps, config.rate.duration);
            Ok(())
        }

        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                bail!("File {:?} already exists. Use --force to overwrite.", output);
            }

            let text = BenchConfig::default().render(format_for(&output))?;
            std::fs::write(&output, text)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Created configuration file: {:?}", output);
            Ok(())
        }

        ConfigAction::Env => {
            println!("Environment Variable Mappings:");
            println!();
            println!("  {:<28} {}", "KVBENCH_CONFIG", "Configuration file path");
            println!("  {:<28} {}", "KVBENCH_ADDR", "Node RPC host:port (default: 127.0.0.1:26657)");
            println!("  {:<28} {}", "KVBENCH_TIMEOUT", "Per-request timeout (default: 5s)");
            println!("  {:<28} {}", "KVBENCH_PREFIX", "Key prefix for load runs (default: bench)");
            println!("  {:<28} {}", "KVBENCH_COUNTER_KEY", "Counter key for rate runs (default: acc2)");
            println!("  {:<28} {}", "KVBENCH_LOG_LEVEL", "Log level (trace/debug/info/warn/error)");
            println!("  {:<28} {}", "KVBENCH_JSON_LOGS", "Enable JSON log format");
            println!("  {:<28} {}", "RUST_LOG", "Overrides the log level filter");
            Ok(())
        }
    }
}

/// Execute the version command
fn execute_version() -> Result<()> {
    println!("kvbench {}", VERSION);
    println!();
    println!("Build Information:");
    println!("  Version:       {}", VERSION);
    println!("  Rust Version:  {}", env!("CARGO_PKG_RUST_VERSION"));
    println!();
    println!("Workloads:");
    println!("  load   closed loop, fixed count, bounded concurrency");
    println!("  rate   open loop, fixed rate, read-back verification");
    Ok(())
}

fn format_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => "toml",
        Some("json") => "json",
        _ => "yaml",
    }
}
