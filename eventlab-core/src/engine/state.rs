//! Run counters and the result of a completed replay.

use crate::performance::MetricsError;
use crate::portfolio::{EquityCurve, MetricsConfig, Portfolio, SummaryStats};
use serde::{Deserialize, Serialize};

/// Event counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub bars: usize,
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
    /// Orders the execution handler declined to fill.
    pub rejected_orders: usize,
}

/// Everything a finished replay leaves behind.
#[derive(Debug)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub equity_curve: EquityCurve,
    pub stats: RunStats,
}

impl BacktestResult {
    pub fn summary_stats(&self, config: &MetricsConfig) -> Result<SummaryStats, MetricsError> {
        self.equity_curve.summary_stats(config)
    }
}
