//! The data handler capability.
//!
//! Everything downstream (portfolio, strategies, execution) reads market data
//! only through this trait, so a historic replay and a live feed are
//! interchangeable. Implementations must never expose a bar before every
//! earlier bar of the same symbol has been exposed.

use super::provider::DataError;
use crate::domain::{Bar, BarField};
use chrono::NaiveDate;

pub trait DataHandler {
    /// Registered symbols, in registration order.
    fn symbols(&self) -> &[String];

    /// All bars observed so far for `symbol`, oldest first.
    ///
    /// Empty before the first [`advance`](DataHandler::advance).
    fn history(&self, symbol: &str) -> Result<&[Bar], DataError>;

    /// Pull the next bar for every registered symbol.
    ///
    /// Returns `false` once the source is exhausted; no bar is appended in
    /// that case.
    fn advance(&mut self) -> bool;

    /// Most recently observed bar.
    fn latest_bar(&self, symbol: &str) -> Result<&Bar, DataError> {
        self.history(symbol)?
            .last()
            .ok_or_else(|| DataError::NoDataYet {
                symbol: symbol.to_string(),
            })
    }

    /// Up to the last `n` observed bars, oldest first. Fewer if the history
    /// is shorter.
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], DataError> {
        let history = self.history(symbol)?;
        Ok(&history[history.len().saturating_sub(n)..])
    }

    /// Date of the most recently observed bar.
    fn latest_bar_date(&self, symbol: &str) -> Result<NaiveDate, DataError> {
        self.latest_bar(symbol).map(|b| b.date)
    }

    /// One field of the most recently observed bar.
    fn latest_bar_value(&self, symbol: &str, field: BarField) -> Result<f64, DataError> {
        self.latest_bar(symbol).map(|b| b.field(field))
    }

    /// One field over up to the last `n` observed bars, oldest first.
    fn latest_bars_values(
        &self,
        symbol: &str,
        field: BarField,
        n: usize,
    ) -> Result<Vec<f64>, DataError> {
        Ok(self
            .latest_bars(symbol, n)?
            .iter()
            .map(|b| b.field(field))
            .collect())
    }

    /// Latest bar date across all symbols. `None` before the first advance.
    fn latest_date(&self) -> Option<NaiveDate> {
        self.symbols()
            .iter()
            .filter_map(|s| self.latest_bar_date(s).ok())
            .max()
    }
}
