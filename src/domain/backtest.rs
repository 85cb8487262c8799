//! Backtest engine and replay loop.
//!
//! `BacktestConfig` carries the run parameters; `simulate` replays indicator
//! rows through the position state machine and `run_backtest` wires the whole
//! pipeline from a raw price series.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::domain::config_validation::validate_parameters;
use crate::domain::error::SwingError;
use crate::domain::indicator::{IndicatorParams, IndicatorRow};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::position::{Book, Fill, Holding, Position, RoundTrip, TradeEvent};
use crate::domain::price::PriceSeries;
use crate::domain::signal::{evaluate, SignalThresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub oscillator_window: usize,
    pub trend_period: usize,
    pub starting_capital: f64,
    pub thresholds: SignalThresholds,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            oscillator_window: 14,
            trend_period: 20,
            starting_capital: 10_000.0,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl BacktestConfig {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            oscillator_window: self.oscillator_window,
            trend_period: self.trend_period,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// A position still held when the series ends, valued at the last close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub holding: Holding,
    pub mark_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub starting_capital: f64,
    /// Cash after the replay; an open position is not liquidated into it.
    pub final_capital: f64,
    pub trades: Vec<TradeEvent>,
    pub profit_loss: f64,
    pub open_position: Option<OpenPosition>,
    pub round_trips: Vec<RoundTrip>,
    pub equity_curve: Vec<EquityPoint>,
}

impl SimulationResult {
    fn idle(starting_capital: f64) -> Self {
        SimulationResult {
            starting_capital,
            final_capital: starting_capital,
            trades: Vec::new(),
            profit_loss: 0.0,
            open_position: None,
            round_trips: Vec::new(),
            equity_curve: Vec::new(),
        }
    }
}

/// Replays `rows` in order, starting at the second row and skipping rows
/// whose indicators are undefined.
pub fn simulate(
    rows: &[IndicatorRow],
    starting_capital: f64,
    thresholds: &SignalThresholds,
) -> SimulationResult {
    let ready = rows.iter().filter(|r| r.is_ready()).count();
    let Some(last_row) = rows.last() else {
        return SimulationResult::idle(starting_capital);
    };
    if ready < 2 {
        debug!(rows = rows.len(), ready, "not enough rows with indicators to trade");
        return SimulationResult::idle(starting_capital);
    }

    let mut book = Book::new(starting_capital);
    let mut trades = Vec::new();
    let mut round_trips = Vec::new();
    let mut equity_curve = Vec::with_capacity(ready);

    for row in rows.iter().skip(1) {
        let Some(readings) = row.readings() else {
            continue;
        };
        let signal = evaluate(&readings, thresholds);
        let (next, fill) = book.step(row.timestamp, row.close, signal);
        book = next;

        match fill {
            Some(Fill::Opened(event)) => trades.push(event),
            Some(Fill::Closed(event, trip)) => {
                trades.push(event);
                round_trips.push(trip);
            }
            None => {}
        }
        equity_curve.push(EquityPoint {
            timestamp: row.timestamp,
            equity: book.equity(row.close),
        });
    }

    let open_position = match book.position {
        Position::Long(holding) => Some(OpenPosition {
            holding,
            mark_price: last_row.close,
            market_value: holding.market_value(last_row.close),
            unrealized_pnl: holding.unrealized_pnl(last_row.close),
        }),
        Position::Flat => None,
    };
    let marked = open_position.map(|p| p.market_value).unwrap_or(0.0);

    SimulationResult {
        starting_capital,
        final_capital: book.capital,
        trades,
        profit_loss: book.capital + marked - starting_capital,
        open_position,
        round_trips,
        equity_curve,
    }
}

/// Indicator rows alongside the replay result.
#[derive(Debug, Clone)]
pub struct Backtest {
    pub rows: Vec<IndicatorRow>,
    pub result: SimulationResult,
}

pub fn run_backtest(series: &PriceSeries, config: &BacktestConfig) -> Result<Backtest, SwingError> {
    validate_parameters(config)?;

    let rows = compute_indicators(series, &config.indicator_params())?;
    let result = simulate(&rows, config.starting_capital, &config.thresholds);

    info!(
        ticker = series.ticker(),
        bars = rows.len(),
        trades = result.trades.len(),
        profit_loss = result.profit_loss,
        "backtest complete"
    );
    Ok(Backtest { rows, result })
}
