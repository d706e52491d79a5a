//! The event queue owned by the simulation loop.
//!
//! Strategies receive it as `&mut EventQueue` for the duration of one
//! dispatch and can only add signals to it. Market, order and fill events
//! are enqueued by the loop itself.

use super::EngineError;
use crate::domain::{Event, SignalEvent};
use chrono::NaiveDate;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
    cycle_date: Option<NaiveDate>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new bar cycle. Events left over from the previous cycle are
    /// a loop bug, so the queue must be empty here.
    pub(crate) fn begin_cycle(&mut self, date: NaiveDate) {
        debug_assert!(self.events.is_empty(), "queue not drained before next cycle");
        self.cycle_date = Some(date);
    }

    /// Date of the bar cycle currently being processed.
    pub fn cycle_date(&self) -> Option<NaiveDate> {
        self.cycle_date
    }

    /// Enqueue a strategy signal for the current cycle.
    ///
    /// The signal must be stamped with [`cycle_date`](Self::cycle_date).
    /// This is the only way to add events from outside the engine:
    ///
    /// ```compile_fail
    /// use eventlab_core::domain::MarketEvent;
    /// use eventlab_core::engine::EventQueue;
    ///
    /// let mut queue = EventQueue::new();
    /// queue.push(MarketEvent).unwrap();
    /// ```
    pub fn push_signal(&mut self, signal: SignalEvent) -> Result<(), EngineError> {
        self.push(signal)
    }

    /// Append an event at the back.
    ///
    /// Signal and fill events carry a date; it must equal the cycle date.
    pub(crate) fn push(&mut self, event: impl Into<Event>) -> Result<(), EngineError> {
        let event = event.into();
        if let Some(event_date) = event.date() {
            if self.cycle_date != Some(event_date) {
                return Err(EngineError::OutOfCycleEvent {
                    kind: event.kind(),
                    event_date,
                    cycle_date: self.cycle_date,
                });
            }
        }
        self.events.push_back(event);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
