//! Historical data: source rows, price adjustment, alignment, and the data
//! handler that replays them.

pub mod adjust;
pub mod align;
pub mod handler;
pub mod historic;
pub mod provider;

pub use adjust::{adjusted_closes, find_discontinuities, Discontinuity};
pub use align::{align_symbols, AlignedData};
pub use handler::DataHandler;
pub use historic::HistoricDataHandler;
pub use provider::{DataError, RawBar};
