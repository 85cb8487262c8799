//! Signal evaluation from oscillator and trend readings.
//!
//! Rules are checked in priority order:
//! 1. oscillator below oversold AND close above trend → `Buy`
//! 2. oscillator above overbought OR close below trend → `Sell`
//! 3. otherwise → `Wait`
//!
//! `Buy` needs both conditions while `Sell` needs either, so selling is the
//! easier trigger.

use std::fmt;

use crate::domain::indicator::{IndicatorRow, Readings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Wait => write!(f, "WAIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

pub fn evaluate(readings: &Readings, thresholds: &SignalThresholds) -> Signal {
    let Readings {
        close,
        oscillator,
        trend,
    } = *readings;

    if oscillator < thresholds.oversold && close > trend {
        Signal::Buy
    } else if oscillator > thresholds.overbought || close < trend {
        Signal::Sell
    } else {
        Signal::Wait
    }
}

/// Signal for the most recent row; `Wait` while its indicators are still warming up.
pub fn current_signal(rows: &[IndicatorRow], thresholds: &SignalThresholds) -> Signal {
    rows.last()
        .and_then(IndicatorRow::readings)
        .map(|r| evaluate(&r, thresholds))
        .unwrap_or(Signal::Wait)
}
