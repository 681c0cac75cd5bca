//! healwatchd — the Healwatch daemon.
//!
//! Loads a task file, builds a `HealthMonitor` with the default checks
//! (`http_get`, `command`) and actions (`restart_supervisor_program`), and
//! runs it until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! healwatchd run --config /etc/healwatch/healwatch.toml
//! healwatchd validate --config /etc/healwatch/healwatch.toml
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use healwatch_core::{HealthwatchConfig, parse_duration};
use healwatch_monitor::{ActionRegistry, CheckRegistry, HealthMonitor};

#[derive(Parser)]
#[command(name = "healwatchd", about = "Healwatch health monitor daemon", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the monitor loop until interrupted.
    Run {
        /// Path to the task configuration file.
        #[arg(short, long)]
        config: PathBuf,

        /// Override `monitor.loop_sleep_interval` (e.g. "500ms", "2s").
        #[arg(long)]
        loop_sleep: Option<String>,
    },
    /// Parse a configuration file and report problems.
    Validate {
        /// Path to the task configuration file.
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json)?;

    match cli.command {
        Command::Run { config, loop_sleep } => run(&config, loop_sleep).await,
        Command::Validate { config } => validate(&config),
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,healwatch=debug"))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(path: &Path, loop_sleep: Option<String>) -> anyhow::Result<HealthwatchConfig> {
    let mut config = HealthwatchConfig::from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;

    if let Some(interval) = loop_sleep {
        anyhow::ensure!(
            parse_duration(&interval).is_some(),
            "invalid --loop-sleep value {interval:?}"
        );
        config.monitor.loop_sleep_interval = interval;
    }
    Ok(config)
}

async fn run(path: &Path, loop_sleep: Option<String>) -> anyhow::Result<()> {
    let config = load_config(path, loop_sleep)?;
    for warning in config.validate() {
        warn!(config = %path.display(), "{warning}");
    }

    let mut monitor = HealthMonitor::from_config(
        config,
        CheckRegistry::with_defaults(),
        ActionRegistry::with_defaults(),
    )?;
    info!(
        config = %path.display(),
        tasks = ?monitor.tracked_tasks(),
        loop_sleep = ?monitor.loop_sleep(),
        "healwatchd starting"
    );

    tokio::select! {
        _ = monitor.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to install Ctrl-C handler")?;
            info!("shutdown signal received");
        }
    }

    info!("healwatchd stopped");
    Ok(())
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let config = load_config(path, None)?;
    let warnings = config.validate();
    let named = config.tasks.iter().filter(|t| t.name.is_some()).count();

    println!("{}: {} task(s), {} named", path.display(), config.tasks.len(), named);
    for warning in &warnings {
        println!("warning: {warning}");
    }
    if warnings.is_empty() {
        println!("ok");
    }
    Ok(())
}
