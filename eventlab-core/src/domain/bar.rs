//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily observation for a single symbol, as exposed by a data handler.
///
/// `adj_close` is derived at load time from the `close`/`yesterday_close`
/// discontinuities; it is never read from the source. All other fields are
/// raw. Forward-filled bars (produced by multi-symbol alignment) repeat the
/// last known observation under the new date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded value for the session.
    pub value: f64,
    pub volume: u64,
    pub open_interest: u64,
    /// The exchange's reference price for the previous session.
    pub yesterday_close: f64,
    pub last: f64,
    pub adj_close: f64,
}

impl Bar {
    /// Read a single numeric field.
    pub fn field(&self, field: BarField) -> f64 {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Value => self.value,
            BarField::Volume => self.volume as f64,
            BarField::OpenInterest => self.open_interest as f64,
            BarField::YesterdayClose => self.yesterday_close,
            BarField::Last => self.last,
            BarField::AdjustedClose => self.adj_close,
        }
    }
}

/// The closed set of numeric bar fields that can be queried by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Value,
    Volume,
    OpenInterest,
    YesterdayClose,
    Last,
    AdjustedClose,
}

impl BarField {
    pub const ALL: [BarField; 10] = [
        BarField::Open,
        BarField::High,
        BarField::Low,
        BarField::Close,
        BarField::Value,
        BarField::Volume,
        BarField::OpenInterest,
        BarField::YesterdayClose,
        BarField::Last,
        BarField::AdjustedClose,
    ];
}
