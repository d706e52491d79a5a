//! Corporate-action price adjustment.
//!
//! The exchange publishes, for every session, the reference close of the
//! previous session (`yesterday_close`). When that reference disagrees with
//! the close actually recorded the day before, a split, capital raise or
//! dividend happened overnight. The ratio `yesterday_close[j] / close[j-1]`
//! rescales every earlier bar so the adjusted series is continuous.

use super::provider::RawBar;

/// A detected price discontinuity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discontinuity {
    /// Index of the first bar on the new price basis.
    pub index: usize,
    /// Multiplier applied to every bar strictly before `index`.
    pub factor: f64,
}

/// Scan a date-sorted series once and report every discontinuity.
pub fn find_discontinuities(rows: &[RawBar]) -> Vec<Discontinuity> {
    rows.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0].close != w[1].yesterday_close)
        .map(|(i, w)| Discontinuity {
            index: i + 1,
            factor: w[1].yesterday_close / w[0].close,
        })
        .collect()
}

/// Compute the adjusted close series for a date-sorted raw series.
///
/// Factors compound: a bar before several discontinuities is scaled by the
/// product of all of them. Bars after the last discontinuity are unchanged.
pub fn adjusted_closes(rows: &[RawBar]) -> Vec<f64> {
    let discontinuities = find_discontinuities(rows);
    let mut adjusted = vec![0.0; rows.len()];
    let mut multiplier = 1.0;
    let mut pending = discontinuities.iter().rev().peekable();

    for k in (0..rows.len()).rev() {
        adjusted[k] = rows[k].close * multiplier;
        while let Some(d) = pending.next_if(|d| d.index == k) {
            multiplier *= d.factor;
        }
    }
    adjusted
}
