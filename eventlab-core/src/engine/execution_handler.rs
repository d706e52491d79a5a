//! Execution handler capability and the simulated fill model.
//!
//! The simulated handler fills every non-empty order in full at the
//! instrument's latest adjusted close. No slippage, no partial fills, no
//! latency. Commission is charged per the configured model.

use super::EngineError;
use crate::data::DataHandler;
use crate::domain::{BarField, FillEvent, OrderEvent};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Turns an order into at most one fill. `None` means the order was rejected.
pub trait ExecutionHandler {
    fn execute(
        &mut self,
        order: &OrderEvent,
        data: &dyn DataHandler,
    ) -> Result<Option<FillEvent>, EngineError>;
}

/// Commission charged on a fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionModel {
    #[default]
    None,
    /// Flat amount per fill, regardless of size.
    PerTrade { amount: f64 },
    /// Percent of traded notional (`0.5` = half a percent).
    Percentage { percent: f64 },
}

impl CommissionModel {
    pub fn commission(&self, fill_price: f64, quantity: u64) -> f64 {
        match *self {
            CommissionModel::None => 0.0,
            CommissionModel::PerTrade { amount } => amount,
            CommissionModel::Percentage { percent } => {
                fill_price * quantity as f64 * percent / 100.0
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedExecutionHandler {
    venue: String,
    commission: CommissionModel,
}

impl SimulatedExecutionHandler {
    pub fn new(venue: impl Into<String>, commission: CommissionModel) -> Self {
        Self {
            venue: venue.into(),
            commission,
        }
    }

    /// Zero-cost fills at venue `SIMULATED`.
    pub fn frictionless() -> Self {
        Self::new("SIMULATED", CommissionModel::None)
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn commission_model(&self) -> CommissionModel {
        self.commission
    }
}

impl Default for SimulatedExecutionHandler {
    fn default() -> Self {
        Self::frictionless()
    }
}

impl ExecutionHandler for SimulatedExecutionHandler {
    fn execute(
        &mut self,
        order: &OrderEvent,
        data: &dyn DataHandler,
    ) -> Result<Option<FillEvent>, EngineError> {
        let bar = data.latest_bar(&order.symbol)?;
        if order.quantity == 0 {
            warn!(%order, "rejecting empty order");
            return Ok(None);
        }
        let fill_cost = bar.field(BarField::AdjustedClose);
        Ok(Some(FillEvent {
            date: bar.date,
            symbol: order.symbol.clone(),
            venue: self.venue.clone(),
            quantity: order.quantity,
            direction: order.direction,
            fill_cost,
            commission: self.commission.commission(fill_cost, order.quantity),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataError, HistoricDataHandler, RawBar};
    use crate::domain::Direction;
    use chrono::NaiveDate;

    fn handler() -> HistoricDataHandler {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let row = RawBar {
            date,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.5,
            value: 0.0,
            volume: 100,
            open_interest: 0,
            yesterday_close: 10.5,
            last: 10.4,
        };
        HistoricDataHandler::new(vec![("A".into(), vec![row])], None).unwrap()
    }

    #[test]
    fn commission_models() {
        assert_eq!(CommissionModel::None.commission(100.0, 10), 0.0);
        assert_eq!(
            CommissionModel::PerTrade { amount: 5.0 }.commission(100.0, 10),
            5.0
        );
        assert!(
            (CommissionModel::Percentage { percent: 0.5 }.commission(100.0, 10) - 5.0).abs()
                < 1e-12
        );
    }

    #[test]
    fn fills_at_latest_adjusted_close() {
        let mut data = handler();
        data.advance();
        let mut exec =
            SimulatedExecutionHandler::new("TSE", CommissionModel::PerTrade { amount: 2.0 });
        let fill = exec
            .execute(&OrderEvent::market("A", 7, Direction::Buy), &data)
            .unwrap()
            .unwrap();
        assert_eq!(fill.fill_cost, 10.5);
        assert_eq!(fill.quantity, 7);
        assert_eq!(fill.venue, "TSE");
        assert_eq!(fill.commission, 2.0);
        assert_eq!(fill.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn empty_order_is_rejected() {
        let mut data = handler();
        data.advance();
        let mut exec = SimulatedExecutionHandler::default();
        let fill = exec
            .execute(&OrderEvent::market("A", 0, Direction::Buy), &data)
            .unwrap();
        assert!(fill.is_none());
    }

    #[test]
    fn order_before_first_bar_fails() {
        let data = handler();
        let mut exec = SimulatedExecutionHandler::default();
        let err = exec
            .execute(&OrderEvent::market("A", 1, Direction::Buy), &data)
            .unwrap_err();
        assert!(matches!(err, EngineError::Data(DataError::NoDataYet { .. })));
    }
}
