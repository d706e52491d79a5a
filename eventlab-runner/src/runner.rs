//! Backtest runner: wires config, data loading, engine and reporting.
//!
//! Two entry points:
//! - `run_from_config()`: loads CSVs from `data_dir`, runs, writes artifacts. Used by the CLI.
//! - `run_from_data()`: takes pre-loaded rows, no I/O.

use anyhow::{Context, Result};
use eventlab_core::data::{HistoricDataHandler, RawBar};
use eventlab_core::engine::{Backtest, SimulatedExecutionHandler, Strategy};
use eventlab_core::portfolio::{EquityCurve, Portfolio};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::loader::load_symbols;
use crate::report::{write_artifacts, ArtifactPaths, RunReport, SCHEMA_VERSION};
use crate::strategies::BuyAndHold;

/// A completed run: the report, the equity table, and where it was written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub equity_curve: EquityCurve,
    pub artifacts: Option<ArtifactPaths>,
}

/// Load, replay and report a run described by `config`.
///
/// Artifacts are written when `config.output_dir` is set.
pub fn run_from_config(config: &RunConfig) -> Result<RunOutcome> {
    config.validate().context("invalid run config")?;
    let series = load_symbols(&config.data_dir, &config.symbols)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;

    let (report, equity_curve) = run_from_data(config, series, BuyAndHold::new())?;

    let artifacts = match &config.output_dir {
        Some(dir) => {
            let paths = write_artifacts(dir, &report, &equity_curve)?;
            info!(dir = %dir.display(), "artifacts written");
            Some(paths)
        }
        None => None,
    };

    Ok(RunOutcome {
        report,
        equity_curve,
        artifacts,
    })
}

/// Replay pre-loaded rows with the given strategy. No I/O.
pub fn run_from_data<S: Strategy>(
    config: &RunConfig,
    series: Vec<(String, Vec<RawBar>)>,
    strategy: S,
) -> Result<(RunReport, EquityCurve)> {
    let config_hash = config.config_hash()?;
    let strategy_id = strategy.id().to_string();

    let data = HistoricDataHandler::new(series, config.start_date)
        .context("failed to prepare historical data")?;
    let timeline = data.timeline();
    let (first_date, last_date) = (timeline.first().copied(), timeline.last().copied());

    let portfolio = Portfolio::new(
        &config.symbols,
        config.initial_capital,
        config.sizing.build(),
    );
    let execution = SimulatedExecutionHandler::new(
        config.execution.venue.clone(),
        config.execution.commission,
    );

    let result = Backtest::new(data, strategy, execution, portfolio)
        .run()
        .context("backtest failed")?;

    let (summary, summary_error) = match result.summary_stats(&config.metrics_config()) {
        Ok(stats) => (Some(stats), None),
        Err(e) => {
            warn!(error = %e, "summary statistics unavailable");
            (None, Some(e.to_string()))
        }
    };

    let holdings = result.portfolio.current_holdings();
    let report = RunReport {
        schema_version: SCHEMA_VERSION,
        config_hash,
        strategy: strategy_id,
        symbols: config.symbols.clone(),
        bar_count: result.stats.bars,
        first_date,
        last_date,
        initial_capital: config.initial_capital,
        final_cash: holdings.cash,
        final_total: result.equity_curve.final_total().unwrap_or(config.initial_capital),
        final_positions: result
            .portfolio
            .positions()
            .iter()
            .map(|(s, q)| (s.clone(), *q))
            .collect(),
        events: result.stats,
        summary,
        summary_error,
    };

    Ok((report, result.equity_curve))
}
