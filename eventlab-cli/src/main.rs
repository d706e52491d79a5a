//! EventLab CLI: run an event-driven backtest from a TOML config.
//!
//! Commands:
//! - `run`: replay the configured instruments with buy-and-hold and print the summary
//! - `check`: parse and validate a config without running it

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventlab_runner::{run_from_config, RunConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eventlab",
    about = "EventLab CLI: event-driven backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts. Overrides `output_dir` in the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the run report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse and validate a config file, printing its hash.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            json,
        } => cmd_run(config, output_dir, json),
        Commands::Check { config } => cmd_check(config),
    }
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_run(config_path: PathBuf, output_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let mut config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    if output_dir.is_some() {
        config.output_dir = output_dir;
    }

    info!(
        config = %config_path.display(),
        symbols = config.symbols.len(),
        "running backtest"
    );
    let outcome = run_from_config(&config)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.report).context("failed to serialize report")?
        );
    } else {
        println!("{}", outcome.report);
    }
    if let Some(paths) = &outcome.artifacts {
        println!();
        println!("Equity curve: {}", paths.equity_csv.display());
        println!("Summary:      {}", paths.summary_json.display());
    }
    Ok(())
}

fn cmd_check(config_path: PathBuf) -> Result<()> {
    let config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    println!("Config OK: {}", config_path.display());
    println!("Symbols: {}", config.symbols.join(", "));
    println!("Hash: {}", config.config_hash()?);
    Ok(())
}
