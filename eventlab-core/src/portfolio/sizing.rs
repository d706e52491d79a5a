//! Order sizing policies: how a signal becomes an order.
//!
//! Both built-in policies share the same long-only gate: enter only when
//! flat, exit only when long, and always exit the whole position. They differ
//! only in the entry quantity. No shorting, no scaling in or out.

use crate::domain::{Direction, OrderEvent, SignalEvent};

/// What a sizer may look at when deciding on an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingContext {
    /// Current signed position in the signal's symbol.
    pub position: i64,
    /// Latest adjusted close of the signal's symbol.
    pub latest_price: f64,
    pub initial_capital: f64,
    pub cash: f64,
}

/// Converts a signal into at most one order.
pub trait OrderSizer: Send + Sync {
    fn name(&self) -> &str;

    fn order_for(&self, signal: &SignalEvent, ctx: &SizingContext) -> Option<OrderEvent>;
}

/// Enter-when-flat / exit-when-long gate shared by the built-in sizers.
fn long_only_gate(
    signal: &SignalEvent,
    position: i64,
    entry_quantity: impl FnOnce() -> Option<u64>,
) -> Option<OrderEvent> {
    match signal.direction {
        Direction::Buy if position == 0 => {
            entry_quantity().map(|q| OrderEvent::market(&signal.symbol, q, Direction::Buy))
        }
        Direction::Sell if position > 0 => Some(OrderEvent::market(
            &signal.symbol,
            position.unsigned_abs(),
            Direction::Sell,
        )),
        _ => None,
    }
}

/// Enters with a constant number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuantitySizer {
    pub quantity: u64,
}

impl FixedQuantitySizer {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl OrderSizer for FixedQuantitySizer {
    fn name(&self) -> &str {
        "fixed_quantity"
    }

    fn order_for(&self, signal: &SignalEvent, ctx: &SizingContext) -> Option<OrderEvent> {
        long_only_gate(signal, ctx.position, || Some(self.quantity))
    }
}

/// Enters with as many whole units as the initial capital buys at the
/// latest adjusted close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllInSizer;

impl OrderSizer for AllInSizer {
    fn name(&self) -> &str {
        "all_in"
    }

    fn order_for(&self, signal: &SignalEvent, ctx: &SizingContext) -> Option<OrderEvent> {
        long_only_gate(signal, ctx.position, || {
            if ctx.latest_price.is_nan()
                || ctx.latest_price <= 0.0
                || !ctx.initial_capital.is_finite()
            {
                return None;
            }
            let units = (ctx.initial_capital / ctx.latest_price).floor();
            (units >= 1.0).then_some(units as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn signal(direction: Direction) -> SignalEvent {
        SignalEvent::new(
            "test",
            "FOLD",
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            direction,
        )
    }

    fn ctx(position: i64) -> SizingContext {
        SizingContext {
            position,
            latest_price: 300.0,
            initial_capital: 100_000.0,
            cash: 100_000.0,
        }
    }

    #[test]
    fn fixed_buy_when_flat() {
        let sizer = FixedQuantitySizer::new(50);
        let order = sizer.order_for(&signal(Direction::Buy), &ctx(0)).unwrap();
        assert_eq!(order.quantity, 50);
        assert_eq!(order.direction, Direction::Buy);
        assert_eq!(order.symbol, "FOLD");
    }

    #[test]
    fn fixed_sell_exits_whole_long() {
        let sizer = FixedQuantitySizer::new(50);
        let order = sizer.order_for(&signal(Direction::Sell), &ctx(73)).unwrap();
        assert_eq!(order.quantity, 73);
        assert_eq!(order.direction, Direction::Sell);
    }

    #[test]
    fn fixed_ignores_other_combinations() {
        let sizer = FixedQuantitySizer::new(50);
        assert!(sizer.order_for(&signal(Direction::Buy), &ctx(10)).is_none());
        assert!(sizer.order_for(&signal(Direction::Buy), &ctx(-10)).is_none());
        assert!(sizer.order_for(&signal(Direction::Sell), &ctx(0)).is_none());
        assert!(sizer.order_for(&signal(Direction::Sell), &ctx(-10)).is_none());
    }

    #[test]
    fn all_in_uses_initial_capital() {
        let order = AllInSizer.order_for(&signal(Direction::Buy), &ctx(0)).unwrap();
        assert_eq!(order.quantity, 333);
    }

    #[test]
    fn all_in_skips_when_price_too_high() {
        let mut c = ctx(0);
        c.latest_price = 200_000.0;
        assert!(AllInSizer.order_for(&signal(Direction::Buy), &c).is_none());
    }
}
