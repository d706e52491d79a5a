//! Run report and artifact export (equity CSV, summary JSON).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use eventlab_core::engine::RunStats;
use eventlab_core::portfolio::{EquityCurve, SummaryStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything `summary.json` records about a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub config_hash: String,
    pub strategy: String,
    pub symbols: Vec<String>,
    pub bar_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub initial_capital: f64,
    pub final_cash: f64,
    pub final_total: f64,
    pub final_positions: BTreeMap<String, i64>,
    pub events: RunStats,
    /// `None` when the return series is degenerate; see `summary_error`.
    pub summary: Option<SummaryStats>,
    pub summary_error: Option<String>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(f, "Symbols: {}", self.symbols.join(", "))?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => {
                writeln!(f, "Bars: {} ({first} to {last})", self.bar_count)?
            }
            _ => writeln!(f, "Bars: {}", self.bar_count)?,
        }
        writeln!(
            f,
            "Events: {} signals, {} orders, {} fills, {} rejected",
            self.events.signals, self.events.orders, self.events.fills, self.events.rejected_orders
        )?;
        match (&self.summary, &self.summary_error) {
            (Some(stats), _) => write!(f, "{stats}"),
            (None, Some(reason)) => write!(f, "Summary unavailable: {reason}"),
            (None, None) => write!(f, "Summary unavailable"),
        }
    }
}

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Write `equity.csv` and `summary.json` into `output_dir`, creating it if needed.
pub fn write_artifacts(
    output_dir: &Path,
    report: &RunReport,
    curve: &EquityCurve,
) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create artifact output directory {}",
            output_dir.display()
        )
    })?;

    let equity_csv = output_dir.join("equity.csv");
    write_equity_csv(&equity_csv, curve)?;

    let summary_json = output_dir.join("summary.json");
    write_summary_json(&summary_json, report)?;

    Ok(ArtifactPaths {
        equity_csv,
        summary_json,
    })
}

/// Export the equity curve table.
///
/// Columns: date, one value column per symbol, cash, commission, total,
/// returns, equity_curve, drawdown
pub fn write_equity_csv(path: &Path, curve: &EquityCurve) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;

    let mut header = vec!["date".to_string()];
    header.extend(curve.symbols().iter().cloned());
    header.extend(
        ["cash", "commission", "total", "returns", "equity_curve", "drawdown"]
            .iter()
            .map(|s| s.to_string()),
    );
    wtr.write_record(&header)?;

    for row in curve.rows() {
        let mut record = vec![row.date.to_string()];
        record.extend(row.market_values.iter().map(|v| format!("{v:.4}")));
        record.push(format!("{:.4}", row.cash));
        record.push(format!("{:.4}", row.commission));
        record.push(format!("{:.4}", row.total));
        record.push(format!("{:.8}", row.returns));
        record.push(format!("{:.8}", row.equity_curve));
        record.push(format!("{:.8}", row.drawdown));
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write equity CSV {}", path.display()))?;
    Ok(())
}

pub fn write_summary_json(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Read a `summary.json` back, rejecting newer schema versions.
pub fn read_summary_json(path: &Path) -> Result<RunReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read summary {}", path.display()))?;
    let report: RunReport =
        serde_json::from_str(&text).context("Failed to deserialize run report")?;
    if report.schema_version > SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}
