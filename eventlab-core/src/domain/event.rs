//! Events flowing through the simulation pipeline.
//!
//! Market → Signal → Order → Fill. Events are plain data; the only behavior
//! is the [`EventKind`] discriminant used by the loop for dispatch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction. There is no neutral state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1 for buys, -1 for sells.
    pub fn multiplier(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// How an order should be worked by the execution handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Market,
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MKT"),
            OrderKind::Limit => write!(f, "LMT"),
        }
    }
}

/// A new bar is now known for every registered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketEvent;

/// A trading intent emitted by a strategy. Not an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub strategy_id: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub direction: Direction,
}

impl SignalEvent {
    pub fn new(
        strategy_id: impl Into<String>,
        symbol: impl Into<String>,
        date: NaiveDate,
        direction: Direction,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            symbol: symbol.into(),
            date,
            direction,
        }
    }
}

/// An actionable instruction for the execution handler.
///
/// Quantity is unsigned; the sign lives in `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: String,
    pub kind: OrderKind,
    pub quantity: u64,
    pub direction: Direction,
}

impl OrderEvent {
    pub fn market(symbol: impl Into<String>, quantity: u64, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            kind: OrderKind::Market,
            quantity,
            direction,
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order: Symbol={}, Type={}, Quantity={}, Direction={}",
            self.symbol, self.kind, self.quantity, self.direction
        )
    }
}

/// The executed result of an order, as reported by the execution handler.
///
/// `fill_cost` is the per-unit execution price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub date: NaiveDate,
    pub symbol: String,
    pub venue: String,
    pub quantity: u64,
    pub direction: Direction,
    pub fill_cost: f64,
    pub commission: f64,
}

impl FillEvent {
    /// Signed cash value of the traded quantity (positive for buys).
    pub fn signed_cost(&self) -> f64 {
        self.direction.multiplier() as f64 * self.fill_cost * self.quantity as f64
    }
}

/// Dispatch tag for [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

/// Everything that can sit on the event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }

    /// The date the event is stamped with, for events that carry one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Event::Signal(s) => Some(s.date),
            Event::Fill(f) => Some(f.date),
            Event::Market(_) | Event::Order(_) => None,
        }
    }
}

impl From<MarketEvent> for Event {
    fn from(e: MarketEvent) -> Self {
        Event::Market(e)
    }
}

impl From<SignalEvent> for Event {
    fn from(e: SignalEvent) -> Self {
        Event::Signal(e)
    }
}

impl From<OrderEvent> for Event {
    fn from(e: OrderEvent) -> Self {
        Event::Order(e)
    }
}

impl From<FillEvent> for Event {
    fn from(e: FillEvent) -> Self {
        Event::Fill(e)
    }
}
