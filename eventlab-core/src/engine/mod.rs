//! Simulation loop and its collaborators.
//!
//! One iteration per calendar bar:
//!
//! 1. Advance the data handler (ends the run when the source is exhausted)
//! 2. Enqueue one `MarketEvent`
//! 3. Drain the queue in FIFO order, dispatching each event:
//!    Market → portfolio mark, then strategy; Signal → portfolio sizing;
//!    Order → execution handler; Fill → portfolio ledger
//!
//! Look-ahead is guarded twice: the data handler only ever exposes bars it
//! has already advanced past, and the queue refuses dated events stamped
//! with anything other than the current cycle's date.

pub mod execution_handler;
pub mod loop_runner;
pub mod queue;
pub mod state;
pub mod strategy;

pub use execution_handler::{CommissionModel, ExecutionHandler, SimulatedExecutionHandler};
pub use loop_runner::Backtest;
pub use queue::EventQueue;
pub use state::{BacktestResult, RunStats};
pub use strategy::Strategy;

use crate::data::DataError;
use crate::domain::EventKind;
use crate::portfolio::PortfolioError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error("{kind:?} event dated {event_date} enqueued during cycle {cycle_date:?}")]
    OutOfCycleEvent {
        kind: EventKind,
        event_date: NaiveDate,
        cycle_date: Option<NaiveDate>,
    },
}
