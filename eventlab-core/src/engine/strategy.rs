//! Strategy capability.

use super::{EngineError, EventQueue};
use crate::data::DataHandler;

/// Reacts to each new bar by emitting zero or more `SignalEvent`s.
///
/// A strategy sees market data only through the data handler and never
/// sees the portfolio. It can only enqueue signals, which must reference
/// registered symbols and be stamped with the queue's cycle date.
pub trait Strategy {
    fn id(&self) -> &str;

    fn on_market(
        &mut self,
        data: &dyn DataHandler,
        events: &mut EventQueue,
    ) -> Result<(), EngineError>;
}
