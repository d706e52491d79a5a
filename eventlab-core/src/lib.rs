//! EventLab Core: event model, data handler, portfolio ledger, analytics, event loop.
//!
//! This crate contains the whole simulation engine:
//! - Domain types (bars, the four event kinds)
//! - Historic data handler with price adjustment and timeline alignment
//! - Portfolio state machine with pluggable order sizing
//! - Pure performance functions (Sharpe ratio, drawdown)
//! - Single-queue event loop with a simulated execution handler

pub mod data;
pub mod domain;
pub mod engine;
pub mod performance;
pub mod portfolio;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: data and ledger types can move to a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Event>();
        require_sync::<domain::Event>();

        // Data
        require_send::<data::HistoricDataHandler>();
        require_sync::<data::HistoricDataHandler>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();

        // Ledger and reporting
        require_send::<portfolio::Portfolio>();
        require_sync::<portfolio::Portfolio>();
        require_send::<portfolio::EquityCurve>();
        require_sync::<portfolio::EquityCurve>();
        require_send::<portfolio::SummaryStats>();
        require_sync::<portfolio::SummaryStats>();

        // Engine
        require_send::<engine::EventQueue>();
        require_sync::<engine::EventQueue>();
        require_send::<engine::SimulatedExecutionHandler>();
        require_sync::<engine::SimulatedExecutionHandler>();
        require_send::<engine::EngineError>();
        require_sync::<engine::EngineError>();
    }

    /// Architecture contract: strategies see market data and the queue, never
    /// the portfolio.
    #[test]
    fn strategy_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            strategy: &mut dyn engine::Strategy,
            data: &dyn data::DataHandler,
            queue: &mut engine::EventQueue,
        ) -> Result<(), engine::EngineError> {
            strategy.on_market(data, queue)
        }
    }
}
