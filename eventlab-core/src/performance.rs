//! Performance analytics: pure functions over return and equity series.
//!
//! No state, no dependencies on the portfolio or the event loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard deviations below this are treated as zero.
const MIN_STD_DEV: f64 = 1e-15;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("degenerate return series ({observations} observations, zero variance)")]
    DegenerateSeries { observations: usize },
}

/// Drawdown analysis of a series against its running high-water mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    /// `highwater(t) - series(t)` at every step. Never negative.
    pub drawdowns: Vec<f64>,
    /// Consecutive steps spent below the high-water mark at every step.
    pub durations: Vec<usize>,
    pub max_drawdown: f64,
    /// Maximum of `durations`.
    ///
    /// This is the longest underwater stretch, which need not be the stretch
    /// containing `max_drawdown`. Known approximation, kept as is.
    pub max_duration: usize,
}

// ─── Individual metric functions ────────────────────────────────────

/// Annualized Sharpe ratio: `sqrt(periods_per_year) * mean / std`.
///
/// Uses the population standard deviation. Callers subtract any per-period
/// risk-free rate beforehand.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> Result<f64, MetricsError> {
    let degenerate = || MetricsError::DegenerateSeries {
        observations: returns.len(),
    };
    if returns.is_empty() {
        return Err(degenerate());
    }
    let mean = mean_f64(returns);
    let std = population_std_dev(returns);
    if std.is_nan() || std < MIN_STD_DEV {
        return Err(degenerate());
    }
    Ok(periods_per_year.sqrt() * mean / std)
}

/// Running drawdown against a high-water mark that starts at zero.
///
/// Starting at zero rather than at `series[0]` means a series that opens
/// above zero has no drawdown on its first step.
pub fn drawdown(series: &[f64]) -> Drawdown {
    let mut drawdowns = Vec::with_capacity(series.len());
    let mut durations = Vec::with_capacity(series.len());
    let mut highwater = 0.0_f64;
    let mut duration = 0_usize;

    for &value in series {
        highwater = highwater.max(value);
        let dd = highwater - value;
        duration = if dd == 0.0 { 0 } else { duration + 1 };
        drawdowns.push(dd);
        durations.push(duration);
    }

    Drawdown {
        max_drawdown: drawdowns.iter().copied().fold(0.0, f64::max),
        max_duration: durations.iter().copied().max().unwrap_or(0),
        drawdowns,
        durations,
    }
}

/// Period-over-period percentage change. A non-positive previous value
/// yields a zero return.
pub fn period_returns(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Sharpe ──

    #[test]
    fn sharpe_known_value() {
        // mean = 0.02, population std = 0.01
        let r = [0.01, 0.03, 0.01, 0.03];
        let s = sharpe_ratio(&r, 252.0).unwrap();
        assert!((s - 252.0_f64.sqrt() * 2.0).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn sharpe_constant_series_is_degenerate() {
        let r = vec![0.01; 50];
        assert_eq!(
            sharpe_ratio(&r, 252.0),
            Err(MetricsError::DegenerateSeries { observations: 50 })
        );
    }

    #[test]
    fn sharpe_empty_series_is_degenerate() {
        assert!(sharpe_ratio(&[], 252.0).is_err());
    }

    #[test]
    fn sharpe_nan_series_is_degenerate() {
        assert!(sharpe_ratio(&[f64::NAN, 0.1], 252.0).is_err());
    }

    #[test]
    fn sharpe_negative_mean_is_negative() {
        let r = [-0.01, -0.03, -0.01, -0.03];
        assert!(sharpe_ratio(&r, 252.0).unwrap() < 0.0);
    }

    // ── Drawdown ──

    #[test]
    fn drawdown_tracks_highwater() {
        let dd = drawdown(&[1.0, 1.2, 1.1, 0.9, 1.3, 1.25]);
        let expected = [0.0, 0.0, 0.1, 0.3, 0.0, 0.05];
        for (a, e) in dd.drawdowns.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12);
        }
        assert_eq!(dd.durations, vec![0, 0, 1, 2, 0, 1]);
        assert!((dd.max_drawdown - 0.3).abs() < 1e-12);
        assert_eq!(dd.max_duration, 2);
    }

    #[test]
    fn drawdown_highwater_starts_at_zero() {
        // A series below zero is underwater from the first step.
        let dd = drawdown(&[-1.0, -2.0]);
        assert_eq!(dd.drawdowns, vec![1.0, 2.0]);
        assert_eq!(dd.durations, vec![1, 2]);
    }

    #[test]
    fn max_duration_is_longest_stretch_not_deepest() {
        // Shallow long stretch, then a deep short one.
        let dd = drawdown(&[1.0, 0.99, 0.99, 0.99, 1.0, 0.5, 1.0]);
        assert_eq!(dd.max_duration, 3);
        assert!((dd.max_drawdown - 0.5).abs() < 1e-12);
    }

    #[test]
    fn drawdown_empty() {
        let dd = drawdown(&[]);
        assert!(dd.drawdowns.is_empty());
        assert_eq!(dd.max_drawdown, 0.0);
        assert_eq!(dd.max_duration, 0);
    }

    // ── Returns ──

    #[test]
    fn period_returns_basic() {
        let r = period_returns(&[100.0, 110.0, 99.0]);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert!((r[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn period_returns_guard_zero_base() {
        assert_eq!(period_returns(&[0.0, 10.0]), vec![0.0]);
        assert!(period_returns(&[1.0]).is_empty());
    }
}
