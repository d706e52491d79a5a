//! The event loop: bar-by-bar replay through a single FIFO queue.

use super::state::BacktestResult;
use super::{EngineError, EventQueue, ExecutionHandler, RunStats, Strategy};
use crate::data::{DataError, DataHandler};
use crate::domain::{Event, MarketEvent};
use crate::portfolio::Portfolio;
use tracing::{debug, info, warn};

/// A configured backtest: one data handler, one strategy, one execution
/// handler, one portfolio, and the queue connecting them.
pub struct Backtest<D, S, E> {
    data: D,
    strategy: S,
    execution: E,
    portfolio: Portfolio,
    queue: EventQueue,
    stats: RunStats,
}

impl<D, S, E> Backtest<D, S, E>
where
    D: DataHandler,
    S: Strategy,
    E: ExecutionHandler,
{
    pub fn new(data: D, strategy: S, execution: E, portfolio: Portfolio) -> Self {
        Self {
            data,
            strategy,
            execution,
            portfolio,
            queue: EventQueue::new(),
            stats: RunStats::default(),
        }
    }

    /// Replay until the data handler is exhausted.
    ///
    /// Any error aborts the run; there is no partial result.
    pub fn run(mut self) -> Result<BacktestResult, EngineError> {
        info!(
            strategy = self.strategy.id(),
            symbols = self.data.symbols().len(),
            initial_capital = self.portfolio.initial_capital(),
            sizer = self.portfolio.sizer_name(),
            "backtest started"
        );

        while self.data.advance() {
            self.run_cycle()?;
        }

        let equity_curve = self.portfolio.build_equity_curve();
        info!(
            bars = self.stats.bars,
            signals = self.stats.signals,
            orders = self.stats.orders,
            fills = self.stats.fills,
            rejected = self.stats.rejected_orders,
            total_return = equity_curve.total_return(),
            "backtest finished"
        );

        Ok(BacktestResult {
            portfolio: self.portfolio,
            equity_curve,
            stats: self.stats,
        })
    }

    /// One bar: enqueue the market event and drain the queue.
    fn run_cycle(&mut self) -> Result<(), EngineError> {
        let date = self.data.latest_date().ok_or(DataError::NoInstruments)?;
        self.queue.begin_cycle(date);
        self.stats.bars += 1;

        self.queue.push(MarketEvent)?;
        while let Some(event) = self.queue.pop() {
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), EngineError> {
        debug!(kind = ?event.kind(), cycle = ?self.queue.cycle_date(), "dispatch");
        match event {
            Event::Market(_) => {
                self.portfolio.on_market(&self.data)?;
                self.strategy.on_market(&self.data, &mut self.queue)?;
            }
            Event::Signal(signal) => {
                self.stats.signals += 1;
                if let Some(order) = self.portfolio.on_signal(&signal, &self.data)? {
                    debug!(%order, "order placed");
                    self.queue.push(order)?;
                }
            }
            Event::Order(order) => {
                self.stats.orders += 1;
                match self.execution.execute(&order, &self.data)? {
                    Some(fill) => self.queue.push(fill)?,
                    None => {
                        self.stats.rejected_orders += 1;
                        warn!(%order, "order not filled");
                    }
                }
            }
            Event::Fill(fill) => {
                self.stats.fills += 1;
                self.portfolio.on_fill(&fill)?;
            }
        }
        Ok(())
    }

    // ─── Accessors ───

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HistoricDataHandler, RawBar};
    use crate::domain::{Direction, EventKind, SignalEvent};
    use crate::engine::SimulatedExecutionHandler;
    use chrono::{Days, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn series(closes: &[f64]) -> Vec<RawBar> {
        let mut prev = closes[0];
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let row = RawBar {
                    date: start() + Days::new(i as u64),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    value: 0.0,
                    volume: 1,
                    open_interest: 0,
                    yesterday_close: prev,
                    last: c,
                };
                prev = c;
                row
            })
            .collect()
    }

    /// Emits the scripted signals on the given bar index.
    struct Scripted {
        bar: usize,
        script: Vec<(usize, &'static str, Direction)>,
        stale: bool,
    }

    impl Strategy for Scripted {
        fn id(&self) -> &str {
            "scripted"
        }

        fn on_market(
            &mut self,
            data: &dyn DataHandler,
            events: &mut EventQueue,
        ) -> Result<(), EngineError> {
            for (at, symbol, direction) in &self.script {
                if *at == self.bar {
                    let mut date = data.latest_bar_date(symbol)?;
                    if self.stale {
                        date = date - Days::new(1);
                    }
                    events.push_signal(SignalEvent::new("scripted", *symbol, date, *direction))?;
                }
            }
            self.bar += 1;
            Ok(())
        }
    }

    fn backtest(
        script: Vec<(usize, &'static str, Direction)>,
        stale: bool,
    ) -> Backtest<HistoricDataHandler, Scripted, SimulatedExecutionHandler> {
        let data = HistoricDataHandler::new(
            vec![
                ("A".into(), series(&[10.0, 11.0, 12.0, 13.0])),
                ("B".into(), series(&[20.0, 20.0, 20.0, 20.0])),
            ],
            None,
        )
        .unwrap();
        let portfolio = Portfolio::naive(data.symbols(), 1_000.0, 10);
        Backtest::new(
            data,
            Scripted {
                bar: 0,
                script,
                stale,
            },
            SimulatedExecutionHandler::frictionless(),
            portfolio,
        )
    }

    #[test]
    fn round_trip_trade() {
        let result = backtest(vec![(0, "A", Direction::Buy), (2, "A", Direction::Sell)], false)
            .run()
            .unwrap();
        assert_eq!(result.stats.bars, 4);
        assert_eq!(result.stats.signals, 2);
        assert_eq!(result.stats.orders, 2);
        assert_eq!(result.stats.fills, 2);
        assert_eq!(result.portfolio.position("A"), Some(0));
        // bought 10 @ 10, sold 10 @ 12
        assert_eq!(result.portfolio.cash(), 1_020.0);
        assert_eq!(result.equity_curve.len(), 4);
        assert_eq!(result.equity_curve.final_total(), Some(1_020.0));
    }

    #[test]
    fn ignored_signals_produce_no_orders() {
        let result = backtest(
            vec![
                (0, "B", Direction::Sell),
                (1, "B", Direction::Buy),
                (2, "B", Direction::Buy),
            ],
            false,
        )
        .run()
        .unwrap();
        assert_eq!(result.stats.signals, 3);
        assert_eq!(result.stats.orders, 1);
        assert_eq!(result.portfolio.position("B"), Some(10));
    }

    #[test]
    fn stale_signal_aborts_run() {
        let err = backtest(vec![(1, "A", Direction::Buy)], true)
            .run()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::OutOfCycleEvent {
                kind: EventKind::Signal,
                ..
            }
        ));
    }

    #[test]
    fn unknown_symbol_signal_aborts_run() {
        let err = backtest(vec![(0, "ZZZ", Direction::Buy)], false)
            .run()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Data(DataError::UnknownInstrument { .. })
        ));
    }

    #[test]
    fn marks_precede_same_bar_fills() {
        let result = backtest(vec![(0, "A", Direction::Buy)], false)
            .run()
            .unwrap();
        let history = result.portfolio.holdings_history();
        // Day 0 is recorded before the fill lands.
        assert_eq!(history[0].total, 1_000.0);
        assert_eq!(history[0].cash, 1_000.0);
        assert_eq!(history[1].cash, 900.0);
        assert_eq!(history[1].market_values[0], 110.0);
        assert_eq!(history[3].total, 900.0 + 130.0);
    }

    #[test]
    fn one_market_event_and_one_record_per_bar() {
        let script = (0..4)
            .flat_map(|bar| [(bar, "A", Direction::Buy), (bar, "B", Direction::Sell)])
            .collect();
        let result = backtest(script, false).run().unwrap();
        assert_eq!(result.stats.bars, 4);
        assert_eq!(result.stats.signals, 8);

        let holdings = result.portfolio.holdings_history();
        let positions = result.portfolio.positions_history();
        assert_eq!(holdings.len(), 4);
        assert_eq!(positions.len(), 4);
        assert!(holdings.windows(2).all(|w| w[0].date < w[1].date));
        assert!(positions.windows(2).all(|w| w[0].date < w[1].date));
    }
}
