//! Holdings and positions records.
//!
//! The live ledger is [`CurrentHoldings`] plus the position map owned by the
//! portfolio. Each mark-to-market appends one fixed-shape snapshot of each;
//! snapshots are never mutated after append.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Instantaneous cash and value state.
///
/// Identity: `total == cash + sum(market_values)`, where market values are
/// those of the last mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentHoldings {
    pub market_values: HashMap<String, f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
}

impl CurrentHoldings {
    pub fn new(symbols: &[String], initial_capital: f64) -> Self {
        Self {
            market_values: symbols.iter().map(|s| (s.clone(), 0.0)).collect(),
            cash: initial_capital,
            commission: 0.0,
            total: initial_capital,
        }
    }
}

/// Holdings at the close of one bar cycle.
///
/// `market_values` is indexed like the portfolio's symbol list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub date: NaiveDate,
    pub market_values: Vec<f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
}

/// Positions at the close of one bar cycle.
///
/// `quantities` is indexed like the portfolio's symbol list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionsSnapshot {
    pub date: NaiveDate,
    pub quantities: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_holdings_are_all_cash() {
        let symbols = vec!["A".to_string(), "B".to_string()];
        let h = CurrentHoldings::new(&symbols, 100_000.0);
        assert_eq!(h.cash, 100_000.0);
        assert_eq!(h.total, 100_000.0);
        assert_eq!(h.commission, 0.0);
        assert_eq!(h.market_values.len(), 2);
        assert!(h.market_values.values().all(|v| *v == 0.0));
    }
}
