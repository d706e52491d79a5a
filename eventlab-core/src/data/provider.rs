//! Raw source rows and structured data error types.
//!
//! Sources (CSV export, in-memory fixtures) produce [`RawBar`]s; the historic
//! data handler validates, adjusts and aligns them before anything is replayed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily row from a historical source (before validation/adjustment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub value: f64,
    pub volume: u64,
    pub open_interest: u64,
    /// Reference close of the previous session, as published by the exchange.
    /// Disagreement with the previous row's `close` marks a corporate action.
    pub yesterday_close: f64,
    pub last: f64,
}

/// Structured error types for data operations.
///
/// Lookup errors (`UnknownInstrument`, `NoDataYet`) are pipeline
/// misconfiguration; load errors are fatal at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("unknown instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("no data yet for '{symbol}': query before the first advance")]
    NoDataYet { symbol: String },

    #[error("malformed source row for '{symbol}' (row {row}): {reason}")]
    Load {
        symbol: String,
        row: usize,
        reason: String,
    },

    #[error("no rows for '{symbol}' after start-date trimming")]
    EmptySource { symbol: String },

    #[error("instrument '{symbol}' registered more than once")]
    DuplicateInstrument { symbol: String },

    #[error("no instruments registered")]
    NoInstruments,
}

impl DataError {
    pub fn load(symbol: &str, row: usize, reason: impl Into<String>) -> Self {
        DataError::Load {
            symbol: symbol.to_string(),
            row,
            reason: reason.into(),
        }
    }
}

impl RawBar {
    /// Check that every field is usable. Returns a reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("value", self.value),
            ("yesterday_close", self.yesterday_close),
            ("last", self.last),
        ];
        for (name, v) in prices {
            if !v.is_finite() {
                return Err(format!("{name} is not finite"));
            }
            if v < 0.0 {
                return Err(format!("{name} is negative ({v})"));
            }
        }
        if self.close <= 0.0 {
            return Err(format!("close must be positive, got {}", self.close));
        }
        if self.yesterday_close <= 0.0 {
            return Err(format!(
                "yesterday_close must be positive, got {}",
                self.yesterday_close
            ));
        }
        if self.high < self.low {
            return Err(format!("high {} below low {}", self.high, self.low));
        }
        Ok(())
    }
}
