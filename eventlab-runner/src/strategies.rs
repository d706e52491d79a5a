//! Built-in strategies.

use eventlab_core::data::DataHandler;
use eventlab_core::domain::{Direction, SignalEvent};
use eventlab_core::engine::{EngineError, EventQueue, Strategy};

/// Buys every registered instrument on the first bar and never trades again.
#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    bought: bool,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn id(&self) -> &str {
        "buy_and_hold"
    }

    fn on_market(
        &mut self,
        data: &dyn DataHandler,
        events: &mut EventQueue,
    ) -> Result<(), EngineError> {
        if self.bought {
            return Ok(());
        }
        for symbol in data.symbols() {
            let date = data.latest_bar_date(symbol)?;
            events.push_signal(SignalEvent::new(self.id(), symbol.as_str(), date, Direction::Buy))?;
        }
        self.bought = true;
        Ok(())
    }
}
