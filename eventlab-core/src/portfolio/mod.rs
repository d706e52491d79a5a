//! Portfolio: sole authority over positions and cash.
//!
//! A state machine with two inputs and one output:
//! - `MarketEvent` → mark every position to the latest adjusted close and
//!   append one holdings record and one positions record
//! - `FillEvent` → update position, cash, commission and total atomically
//! - `SignalEvent` → at most one `OrderEvent`, via the configured sizer
//!
//! The equity curve is derived from the holdings history after replay.

pub mod equity;
pub mod holdings;
pub mod sizing;

pub use equity::{EquityCurve, EquityRow, MetricsConfig, SummaryStats};
pub use holdings::{CurrentHoldings, HoldingsSnapshot, PositionsSnapshot};
pub use sizing::{AllInSizer, FixedQuantitySizer, OrderSizer, SizingContext};

use crate::data::{DataError, DataHandler};
use crate::domain::{BarField, FillEvent, OrderEvent, SignalEvent};
use crate::performance::MetricsError;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid fill for '{symbol}': {reason}")]
    InvalidFill { symbol: String, reason: String },
}

pub struct Portfolio {
    symbols: Vec<String>,
    initial_capital: f64,
    positions: HashMap<String, i64>,
    holdings: CurrentHoldings,
    positions_history: Vec<PositionsSnapshot>,
    holdings_history: Vec<HoldingsSnapshot>,
    sizer: Box<dyn OrderSizer>,
}

impl std::fmt::Debug for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portfolio")
            .field("symbols", &self.symbols)
            .field("initial_capital", &self.initial_capital)
            .field("positions", &self.positions)
            .field("holdings", &self.holdings)
            .field("bars_recorded", &self.holdings_history.len())
            .field("sizer", &self.sizer.name())
            .finish()
    }
}

impl Portfolio {
    pub fn new(symbols: &[String], initial_capital: f64, sizer: Box<dyn OrderSizer>) -> Self {
        Self {
            symbols: symbols.to_vec(),
            initial_capital,
            positions: symbols.iter().map(|s| (s.clone(), 0)).collect(),
            holdings: CurrentHoldings::new(symbols, initial_capital),
            positions_history: Vec::new(),
            holdings_history: Vec::new(),
            sizer,
        }
    }

    /// Portfolio with the fixed-quantity naive sizer.
    pub fn naive(symbols: &[String], initial_capital: f64, quantity: u64) -> Self {
        Self::new(
            symbols,
            initial_capital,
            Box::new(FixedQuantitySizer::new(quantity)),
        )
    }

    // ─── Event handlers ───

    /// Mark to market and append one record to each history.
    ///
    /// Must run after the data handler's `advance` for the cycle. All prices
    /// are looked up before anything is mutated.
    pub fn on_market(&mut self, bars: &dyn DataHandler) -> Result<(), PortfolioError> {
        let date = bars.latest_date().ok_or_else(|| DataError::NoDataYet {
            symbol: self.symbols.first().cloned().unwrap_or_default(),
        })?;

        let mut quantities = Vec::with_capacity(self.symbols.len());
        let mut market_values = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            let quantity = self.positions.get(symbol).copied().unwrap_or(0);
            let price = bars.latest_bar_value(symbol, BarField::AdjustedClose)?;
            quantities.push(quantity);
            market_values.push(quantity as f64 * price);
        }

        let total = self.holdings.cash + market_values.iter().sum::<f64>();
        for (symbol, value) in self.symbols.iter().zip(&market_values) {
            self.holdings.market_values.insert(symbol.clone(), *value);
        }
        self.holdings.total = total;

        self.positions_history.push(PositionsSnapshot { date, quantities });
        self.holdings_history.push(HoldingsSnapshot {
            date,
            market_values,
            cash: self.holdings.cash,
            commission: self.holdings.commission,
            total,
        });
        Ok(())
    }

    /// Apply a fill to the position and holdings together, or not at all.
    pub fn on_fill(&mut self, fill: &FillEvent) -> Result<(), PortfolioError> {
        let invalid = |reason: String| PortfolioError::InvalidFill {
            symbol: fill.symbol.clone(),
            reason,
        };
        let current = *self
            .positions
            .get(&fill.symbol)
            .ok_or_else(|| DataError::UnknownInstrument {
                symbol: fill.symbol.clone(),
            })?;
        if !fill.fill_cost.is_finite() || fill.fill_cost < 0.0 {
            return Err(invalid(format!("fill cost {}", fill.fill_cost)));
        }
        if !fill.commission.is_finite() || fill.commission < 0.0 {
            return Err(invalid(format!("commission {}", fill.commission)));
        }
        let quantity = i64::try_from(fill.quantity)
            .map_err(|_| invalid(format!("quantity {} overflows", fill.quantity)))?;
        let updated = quantity
            .checked_mul(fill.direction.multiplier())
            .and_then(|delta| current.checked_add(delta))
            .ok_or_else(|| invalid("position overflows".to_string()))?;

        let cost = fill.signed_cost();
        self.positions.insert(fill.symbol.clone(), updated);
        self.holdings.cash -= cost + fill.commission;
        self.holdings.commission += fill.commission;
        self.holdings.total -= cost + fill.commission;

        debug!(
            symbol = %fill.symbol,
            direction = %fill.direction,
            quantity = fill.quantity,
            position = updated,
            cash = self.holdings.cash,
            "fill applied"
        );
        Ok(())
    }

    /// Turn a signal into at most one order.
    pub fn on_signal(
        &self,
        signal: &SignalEvent,
        bars: &dyn DataHandler,
    ) -> Result<Option<OrderEvent>, PortfolioError> {
        let position = *self
            .positions
            .get(&signal.symbol)
            .ok_or_else(|| DataError::UnknownInstrument {
                symbol: signal.symbol.clone(),
            })?;
        let ctx = SizingContext {
            position,
            latest_price: bars.latest_bar_value(&signal.symbol, BarField::AdjustedClose)?,
            initial_capital: self.initial_capital,
            cash: self.holdings.cash,
        };
        Ok(self.sizer.order_for(signal, &ctx))
    }

    // ─── Reporting ───

    /// Derive the equity curve from the holdings history.
    pub fn build_equity_curve(&self) -> EquityCurve {
        EquityCurve::from_holdings(&self.symbols, &self.holdings_history)
    }

    pub fn summary_stats(&self, config: &MetricsConfig) -> Result<SummaryStats, MetricsError> {
        self.build_equity_curve().summary_stats(config)
    }

    // ─── Accessors ───

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Signed position, `None` for an unregistered symbol.
    pub fn position(&self, symbol: &str) -> Option<i64> {
        self.positions.get(symbol).copied()
    }

    pub fn positions(&self) -> &HashMap<String, i64> {
        &self.positions
    }

    pub fn current_holdings(&self) -> &CurrentHoldings {
        &self.holdings
    }

    pub fn cash(&self) -> f64 {
        self.holdings.cash
    }

    pub fn holdings_history(&self) -> &[HoldingsSnapshot] {
        &self.holdings_history
    }

    pub fn positions_history(&self) -> &[PositionsSnapshot] {
        &self.positions_history
    }

    pub fn sizer_name(&self) -> &str {
        self.sizer.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HistoricDataHandler, RawBar};
    use crate::domain::Direction;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(closes: &[f64]) -> Vec<RawBar> {
        let mut prev = closes[0];
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let row = RawBar {
                    date: day(i as u32 + 1),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    value: 0.0,
                    volume: 0,
                    open_interest: 0,
                    yesterday_close: prev,
                    last: c,
                };
                prev = c;
                row
            })
            .collect()
    }

    fn setup() -> (HistoricDataHandler, Portfolio) {
        let data = HistoricDataHandler::new(
            vec![
                ("A".into(), series(&[100.0, 110.0])),
                ("B".into(), series(&[50.0, 40.0])),
            ],
            None,
        )
        .unwrap();
        let portfolio = Portfolio::naive(data.symbols(), 100_000.0, 10);
        (data, portfolio)
    }

    fn fill(
        symbol: &str,
        direction: Direction,
        quantity: u64,
        price: f64,
        commission: f64,
    ) -> FillEvent {
        FillEvent {
            date: day(1),
            symbol: symbol.into(),
            venue: "SIMULATED".into(),
            quantity,
            direction,
            fill_cost: price,
            commission,
        }
    }

    #[test]
    fn first_record_is_all_cash() {
        let (mut data, mut pf) = setup();
        data.advance();
        pf.on_market(&data).unwrap();
        let first = &pf.holdings_history()[0];
        assert_eq!(first.cash, 100_000.0);
        assert_eq!(first.total, 100_000.0);
        assert_eq!(first.commission, 0.0);
        assert_eq!(first.market_values, vec![0.0, 0.0]);
        assert_eq!(pf.positions_history()[0].quantities, vec![0, 0]);
    }

    #[test]
    fn market_before_advance_is_no_data_yet() {
        let (data, mut pf) = setup();
        assert!(matches!(
            pf.on_market(&data),
            Err(PortfolioError::Data(DataError::NoDataYet { .. }))
        ));
        assert!(pf.holdings_history().is_empty());
    }

    #[test]
    fn fill_updates_position_and_cash() {
        let (_, mut pf) = setup();
        pf.on_fill(&fill("A", Direction::Buy, 10, 100.0, 5.0)).unwrap();
        assert_eq!(pf.position("A"), Some(10));
        assert_eq!(pf.cash(), 100_000.0 - 1_000.0 - 5.0);
        assert_eq!(pf.current_holdings().commission, 5.0);
        assert_eq!(pf.current_holdings().total, 100_000.0 - 1_005.0);

        pf.on_fill(&fill("A", Direction::Sell, 10, 110.0, 5.0)).unwrap();
        assert_eq!(pf.position("A"), Some(0));
        assert_eq!(pf.cash(), 100_000.0 - 1_005.0 + 1_100.0 - 5.0);
        assert_eq!(pf.current_holdings().commission, 10.0);
    }

    #[test]
    fn unknown_fill_changes_nothing() {
        let (_, mut pf) = setup();
        let err = pf
            .on_fill(&fill("ZZZ", Direction::Buy, 1, 1.0, 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Data(DataError::UnknownInstrument { .. })
        ));
        assert_eq!(pf.cash(), 100_000.0);
    }

    #[test]
    fn invalid_fill_changes_nothing() {
        let (_, mut pf) = setup();
        assert!(pf
            .on_fill(&fill("A", Direction::Buy, 1, f64::NAN, 0.0))
            .is_err());
        assert!(pf
            .on_fill(&fill("A", Direction::Buy, 1, 10.0, -1.0))
            .is_err());
        assert!(pf
            .on_fill(&fill("A", Direction::Buy, u64::MAX, 10.0, 0.0))
            .is_err());
        assert_eq!(pf.position("A"), Some(0));
        assert_eq!(pf.cash(), 100_000.0);
    }

    #[test]
    fn mark_to_market_uses_adjusted_close() {
        let (mut data, mut pf) = setup();
        data.advance();
        pf.on_market(&data).unwrap();
        pf.on_fill(&fill("A", Direction::Buy, 10, 100.0, 0.0)).unwrap();
        data.advance();
        pf.on_market(&data).unwrap();

        let last = pf.holdings_history().last().unwrap();
        assert_eq!(last.date, day(2));
        assert_eq!(last.market_values, vec![1_100.0, 0.0]);
        assert_eq!(last.total, 99_000.0 + 1_100.0);
        assert_eq!(pf.current_holdings().total, last.total);
        assert_eq!(pf.positions_history().last().unwrap().quantities, vec![10, 0]);
    }

    #[test]
    fn signal_goes_through_sizer() {
        let (mut data, mut pf) = setup();
        data.advance();
        pf.on_market(&data).unwrap();
        let buy = SignalEvent::new("s", "A", day(1), Direction::Buy);
        let order = pf.on_signal(&buy, &data).unwrap().unwrap();
        assert_eq!(order.quantity, 10);

        let sell = SignalEvent::new("s", "A", day(1), Direction::Sell);
        assert!(pf.on_signal(&sell, &data).unwrap().is_none());

        let unknown = SignalEvent::new("s", "ZZZ", day(1), Direction::Buy);
        assert!(pf.on_signal(&unknown, &data).is_err());
    }

    #[test]
    fn all_in_portfolio_sizes_from_capital() {
        let (mut data, _) = setup();
        data.advance();
        let pf = Portfolio::new(data.symbols(), 100_000.0, Box::new(AllInSizer));
        let buy = SignalEvent::new("s", "B", day(1), Direction::Buy);
        let order = pf.on_signal(&buy, &data).unwrap().unwrap();
        assert_eq!(order.quantity, 2_000);
        assert_eq!(pf.sizer_name(), "all_in");
    }
}
