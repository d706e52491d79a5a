//! Multi-symbol time alignment.
//!
//! Given bars for multiple symbols, align them to a common timeline built
//! from the union of their dates. A symbol with no observation on a date
//! inherits its last known bar (forward fill), so every step of the timeline
//! has exactly one bar per symbol.
//!
//! The timeline starts at the first date on which every symbol has been
//! observed at least once. Earlier dates are dropped rather than back-filled,
//! since back-filling would leak a future bar into the past.

use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone)]
pub struct AlignedData {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Bars per symbol, aligned to the common timeline.
    /// Each inner Vec has the same length as `dates`.
    pub bars: HashMap<String, Vec<Bar>>,
    /// Symbols included, in registration order.
    pub symbols: Vec<String>,
}

impl AlignedData {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Align multiple date-sorted symbol series to a common timeline.
pub fn align_symbols(symbol_bars: Vec<(String, Vec<Bar>)>) -> AlignedData {
    let symbols: Vec<String> = symbol_bars.iter().map(|(s, _)| s.clone()).collect();

    // Latest first-observation across symbols; None if any symbol is empty
    let start = symbol_bars
        .iter()
        .map(|(_, bars)| bars.first().map(|b| b.date))
        .try_fold(NaiveDate::MIN, |acc, first| first.map(|d| acc.max(d)));

    let Some(start) = start else {
        return AlignedData {
            dates: Vec::new(),
            bars: symbols.iter().map(|s| (s.clone(), Vec::new())).collect(),
            symbols,
        };
    };

    // Collect the union of all dates from the common start onwards
    let mut all_dates = BTreeSet::new();
    for (_, bars) in &symbol_bars {
        for bar in bars {
            if bar.date >= start {
                all_dates.insert(bar.date);
            }
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let mut aligned: HashMap<String, Vec<Bar>> = HashMap::new();
    for (symbol, bars) in symbol_bars {
        aligned.insert(symbol, forward_fill(&bars, &dates));
    }

    AlignedData {
        dates,
        bars: aligned,
        symbols,
    }
}

/// Reindex one series onto `dates`, carrying the last known bar forward.
///
/// The caller guarantees the series has an observation on or before
/// `dates[0]`.
fn forward_fill(bars: &[Bar], dates: &[NaiveDate]) -> Vec<Bar> {
    let mut out = Vec::with_capacity(dates.len());
    let mut cursor = 0;
    let mut last: Option<&Bar> = None;

    for date in dates {
        while cursor < bars.len() && bars[cursor].date <= *date {
            last = Some(&bars[cursor]);
            cursor += 1;
        }
        if let Some(bar) = last {
            let mut filled = bar.clone();
            filled.date = *date;
            out.push(filled);
        }
    }
    out
}
