//! Historic data handler: replays pre-loaded daily bars one date at a time.
//!
//! Construction does all the work up front (validation, start-date trimming,
//! price adjustment, alignment) and fails fast on any malformed row. After
//! that, replay is pure in-memory iteration. Unobserved bars sit behind
//! per-symbol iterators, so nothing can read a bar before `advance` has
//! released it.

use super::adjust::{adjusted_closes, find_discontinuities};
use super::align::align_symbols;
use super::handler::DataHandler;
use super::provider::{DataError, RawBar};
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Data handler over an already-parsed historical source.
#[derive(Debug)]
pub struct HistoricDataHandler {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    pending: HashMap<String, std::vec::IntoIter<Bar>>,
    observed: HashMap<String, Vec<Bar>>,
    continue_backtest: bool,
}

impl HistoricDataHandler {
    /// Build a handler from raw rows per symbol.
    ///
    /// Rows may arrive in any order; they are sorted ascending by date.
    /// Rows dated on or before `start_date` are discarded before adjustment.
    pub fn new(
        sources: Vec<(String, Vec<RawBar>)>,
        start_date: Option<NaiveDate>,
    ) -> Result<Self, DataError> {
        if sources.is_empty() {
            return Err(DataError::NoInstruments);
        }

        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(sources.len());
        for (symbol, rows) in sources {
            if !seen.insert(symbol.clone()) {
                return Err(DataError::DuplicateInstrument { symbol });
            }
            let bars = prepare_series(&symbol, rows, start_date)?;
            prepared.push((symbol, bars));
        }

        let aligned = align_symbols(prepared);
        info!(
            symbols = aligned.symbols.len(),
            bars = aligned.dates.len(),
            "historic data loaded"
        );

        let symbols = aligned.symbols;
        let mut bars = aligned.bars;
        let mut pending = HashMap::with_capacity(symbols.len());
        let mut observed = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            let series = bars.remove(symbol).unwrap_or_default();
            observed.insert(symbol.clone(), Vec::with_capacity(series.len()));
            pending.insert(symbol.clone(), series.into_iter());
        }

        Ok(Self {
            symbols,
            dates: aligned.dates,
            pending,
            observed,
            continue_backtest: true,
        })
    }

    /// False once the source has been exhausted.
    pub fn continue_backtest(&self) -> bool {
        self.continue_backtest
    }

    /// The full replay timeline (dates only; no bar data is exposed).
    pub fn timeline(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of bar cycles not yet replayed.
    pub fn remaining(&self) -> usize {
        self.symbols
            .first()
            .and_then(|s| self.pending.get(s))
            .map_or(0, |it| it.len())
    }
}

impl DataHandler for HistoricDataHandler {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn history(&self, symbol: &str) -> Result<&[Bar], DataError> {
        self.observed
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::UnknownInstrument {
                symbol: symbol.to_string(),
            })
    }

    fn advance(&mut self) -> bool {
        if !self.continue_backtest {
            return false;
        }

        let mut next = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            match self.pending.get_mut(symbol).and_then(|it| it.next()) {
                Some(bar) => next.push(bar),
                None => {
                    self.continue_backtest = false;
                    debug!(%symbol, "source exhausted");
                    return false;
                }
            }
        }

        for bar in next {
            if let Some(history) = self.observed.get_mut(&bar.symbol) {
                history.push(bar);
            }
        }
        true
    }
}

/// Validate, sort, trim and adjust one symbol's rows.
fn prepare_series(
    symbol: &str,
    rows: Vec<RawBar>,
    start_date: Option<NaiveDate>,
) -> Result<Vec<Bar>, DataError> {
    for (i, row) in rows.iter().enumerate() {
        row.validate()
            .map_err(|reason| DataError::load(symbol, i + 1, reason))?;
    }

    let mut rows = rows;
    rows.sort_by_key(|r| r.date);
    if let Some(w) = rows.windows(2).position(|w| w[0].date == w[1].date) {
        return Err(DataError::load(
            symbol,
            w + 2,
            format!("duplicate date {}", rows[w].date),
        ));
    }

    if let Some(start) = start_date {
        rows.retain(|r| r.date > start);
    }
    if rows.is_empty() {
        return Err(DataError::EmptySource {
            symbol: symbol.to_string(),
        });
    }

    for d in find_discontinuities(&rows) {
        debug!(
            %symbol,
            date = %rows[d.index].date,
            factor = d.factor,
            "price discontinuity"
        );
    }
    let adjusted = adjusted_closes(&rows);

    Ok(rows
        .into_iter()
        .zip(adjusted)
        .map(|(r, adj_close)| Bar {
            symbol: symbol.to_string(),
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            value: r.value,
            volume: r.volume,
            open_interest: r.open_interest,
            yesterday_close: r.yesterday_close,
            last: r.last,
            adj_close,
        })
        .collect())
}
