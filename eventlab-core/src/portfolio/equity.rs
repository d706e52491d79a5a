//! Equity curve and summary statistics, derived once after replay.

use super::holdings::HoldingsSnapshot;
use crate::performance::{drawdown, period_returns, sharpe_ratio, MetricsError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters for the summary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Annual risk-free rate, converted per period before the Sharpe ratio.
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: 252.0,
        }
    }
}

/// One row of the report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    pub date: NaiveDate,
    /// Indexed like [`EquityCurve::symbols`].
    pub market_values: Vec<f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
    /// Percentage change of `total` from the previous row (0.0 on the first row).
    pub returns: f64,
    /// Running product of `1 + returns`.
    pub equity_curve: f64,
    pub drawdown: f64,
}

/// The finalized holdings history with derived return/growth/drawdown columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    symbols: Vec<String>,
    rows: Vec<EquityRow>,
    max_drawdown: f64,
    drawdown_duration: usize,
}

impl EquityCurve {
    /// Derive the curve from a holdings history. Pure; not incremental.
    pub fn from_holdings(symbols: &[String], history: &[HoldingsSnapshot]) -> Self {
        let totals: Vec<f64> = history.iter().map(|snap| snap.total).collect();
        // The first row has no predecessor.
        let period = std::iter::once(0.0).chain(period_returns(&totals));

        let mut rows = Vec::with_capacity(history.len());
        let mut growth = 1.0;
        for (snap, returns) in history.iter().zip(period) {
            growth *= 1.0 + returns;

            rows.push(EquityRow {
                date: snap.date,
                market_values: snap.market_values.clone(),
                cash: snap.cash,
                commission: snap.commission,
                total: snap.total,
                returns,
                equity_curve: growth,
                drawdown: 0.0,
            });
        }

        let growth_series: Vec<f64> = rows.iter().map(|r| r.equity_curve).collect();
        let dd = drawdown(&growth_series);
        for (row, value) in rows.iter_mut().zip(&dd.drawdowns) {
            row.drawdown = *value;
        }

        Self {
            symbols: symbols.to_vec(),
            rows,
            max_drawdown: dd.max_drawdown,
            drawdown_duration: dd.max_duration,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[EquityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period returns, excluding the first row which has no predecessor.
    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().skip(1).map(|r| r.returns).collect()
    }

    /// Final growth factor minus one.
    pub fn total_return(&self) -> f64 {
        self.rows.last().map_or(0.0, |r| r.equity_curve - 1.0)
    }

    pub fn final_total(&self) -> Option<f64> {
        self.rows.last().map(|r| r.total)
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn drawdown_duration(&self) -> usize {
        self.drawdown_duration
    }

    /// The fixed summary report.
    ///
    /// Fails with `DegenerateSeries` when the excess returns have zero
    /// variance (including runs too short to have any return).
    pub fn summary_stats(&self, config: &MetricsConfig) -> Result<SummaryStats, MetricsError> {
        let per_period_rf = config.risk_free_rate / config.periods_per_year;
        let excess: Vec<f64> = self.returns().iter().map(|r| r - per_period_rf).collect();
        let sharpe = sharpe_ratio(&excess, config.periods_per_year)?;

        Ok(SummaryStats {
            total_return: self.total_return(),
            final_total: self.final_total().unwrap_or(0.0),
            sharpe_ratio: sharpe,
            max_drawdown: self.max_drawdown,
            drawdown_duration: self.drawdown_duration,
        })
    }
}

/// End-of-run report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_return: f64,
    pub final_total: f64,
    pub sharpe_ratio: f64,
    /// In growth-factor units (0.1 = ten points of initial capital).
    pub max_drawdown: f64,
    /// In bars. See [`crate::performance::Drawdown::max_duration`].
    pub drawdown_duration: usize,
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Portfolio Return: {:.2}%", self.total_return * 100.0)?;
        writeln!(f, "Portfolio Value: {:.0}", self.final_total)?;
        writeln!(f, "Annualized Sharpe Ratio: {:.2}", self.sharpe_ratio)?;
        writeln!(f, "Max Drawdown: {:.2}%", self.max_drawdown * 100.0)?;
        write!(f, "Drawdown Duration: {}", self.drawdown_duration)
    }
}
