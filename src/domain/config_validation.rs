//! Configuration validation.
//!
//! Validates all config fields before a run.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::SwingError;
use crate::domain::price::{HistoryPeriod, Interval};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_data_section(config)?;
    validate_strategy_section(config)?;
    Ok(())
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), SwingError> {
    if let Some(ticker) = config.get_string("data", "ticker") {
        if ticker.trim().is_empty() {
            return Err(SwingError::invalid("data", "ticker", "ticker must not be empty"));
        }
    }
    if let Some(period) = config.get_string("data", "period") {
        period
            .parse::<HistoryPeriod>()
            .map_err(|reason| SwingError::invalid("data", "period", reason))?;
    }
    if let Some(interval) = config.get_string("data", "interval") {
        interval
            .parse::<Interval>()
            .map_err(|reason| SwingError::invalid("data", "interval", reason))?;
    }
    Ok(())
}

fn validate_strategy_section(config: &dyn ConfigPort) -> Result<(), SwingError> {
    for key in ["oscillator_window", "trend_period"] {
        if let Some(raw) = config.get_string("strategy", key) {
            raw.trim().parse::<i64>().map_err(|_| {
                SwingError::invalid("strategy", key, format!("'{raw}' is not an integer"))
            })?;
        }
    }
    for key in ["starting_capital", "oversold", "overbought"] {
        if let Some(raw) = config.get_string("strategy", key) {
            raw.trim().parse::<f64>().map_err(|_| {
                SwingError::invalid("strategy", key, format!("'{raw}' is not a number"))
            })?;
        }
    }

    let defaults = BacktestConfig::default();
    let window = config.get_int("strategy", "oscillator_window", defaults.oscillator_window as i64);
    if window < 2 {
        return Err(SwingError::invalid(
            "strategy",
            "oscillator_window",
            "oscillator_window must be at least 2",
        ));
    }
    let trend = config.get_int("strategy", "trend_period", defaults.trend_period as i64);
    if trend < 1 {
        return Err(SwingError::invalid(
            "strategy",
            "trend_period",
            "trend_period must be at least 1",
        ));
    }
    Ok(())
}

/// Checks a fully built config; shared by the CLI and `run_backtest`.
pub fn validate_parameters(config: &BacktestConfig) -> Result<(), SwingError> {
    if config.oscillator_window < 2 {
        return Err(SwingError::invalid(
            "strategy",
            "oscillator_window",
            "oscillator_window must be at least 2",
        ));
    }
    if config.trend_period < 1 {
        return Err(SwingError::invalid(
            "strategy",
            "trend_period",
            "trend_period must be at least 1",
        ));
    }
    if !config.starting_capital.is_finite() || config.starting_capital <= 0.0 {
        return Err(SwingError::invalid(
            "strategy",
            "starting_capital",
            "starting_capital must be positive",
        ));
    }

    let t = &config.thresholds;
    if !(0.0..=100.0).contains(&t.oversold) {
        return Err(SwingError::invalid(
            "strategy",
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&t.overbought) {
        return Err(SwingError::invalid(
            "strategy",
            "overbought",
            "overbought must be between 0 and 100",
        ));
    }
    if t.oversold >= t.overbought {
        return Err(SwingError::invalid(
            "strategy",
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::signal::SignalThresholds;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn assert_invalid_key(result: Result<(), SwingError>, expected: &str) {
        match result {
            Err(SwingError::ConfigInvalid { key, .. }) => assert_eq!(key, expected),
            other => panic!("expected ConfigInvalid for {expected}, got {other:?}"),
        }
    }

    #[test]
    fn full_config_is_valid() {
        let cfg = adapter(
            "[data]\nticker = PETR4.SA\nperiod = 6mo\ninterval = 1d\n\
             [strategy]\noscillator_window = 14\ntrend_period = 20\nstarting_capital = 10000\n",
        );
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        assert!(validate_config(&adapter("[data]\n")).is_ok());
    }

    #[test]
    fn unknown_period_rejected() {
        let cfg = adapter("[data]\nperiod = 7w\n");
        assert_invalid_key(validate_config(&cfg), "period");
    }

    #[test]
    fn unknown_interval_rejected() {
        let cfg = adapter("[data]\ninterval = 15m\n");
        assert_invalid_key(validate_config(&cfg), "interval");
    }

    #[test]
    fn blank_ticker_rejected() {
        let cfg = adapter("[data]\nticker =   \n");
        assert_invalid_key(validate_config(&cfg), "ticker");
    }

    #[test]
    fn window_below_two_rejected() {
        let cfg = adapter("[strategy]\noscillator_window = 1\n");
        assert_invalid_key(validate_config(&cfg), "oscillator_window");
    }

    #[test]
    fn non_numeric_window_rejected() {
        let cfg = adapter("[strategy]\noscillator_window = fourteen\n");
        assert_invalid_key(validate_config(&cfg), "oscillator_window");
    }

    #[test]
    fn non_numeric_capital_rejected() {
        let cfg = adapter("[strategy]\nstarting_capital = lots\n");
        assert_invalid_key(validate_config(&cfg), "starting_capital");
    }

    #[test]
    fn zero_trend_rejected() {
        let cfg = adapter("[strategy]\ntrend_period = 0\n");
        assert_invalid_key(validate_config(&cfg), "trend_period");
    }

    #[test]
    fn parameters_default_valid() {
        assert!(validate_parameters(&BacktestConfig::default()).is_ok());
    }

    #[test]
    fn parameters_reject_non_positive_capital() {
        for capital in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let c = BacktestConfig {
                starting_capital: capital,
                ..BacktestConfig::default()
            };
            assert_invalid_key(validate_parameters(&c), "starting_capital");
        }
    }

    #[test]
    fn parameters_reject_crossed_thresholds() {
        let c = BacktestConfig {
            thresholds: SignalThresholds {
                oversold: 70.0,
                overbought: 30.0,
            },
            ..BacktestConfig::default()
        };
        assert_invalid_key(validate_parameters(&c), "oversold");
    }

    #[test]
    fn parameters_reject_out_of_range_threshold() {
        let c = BacktestConfig {
            thresholds: SignalThresholds {
                oversold: 30.0,
                overbought: 120.0,
            },
            ..BacktestConfig::default()
        };
        assert_invalid_key(validate_parameters(&c), "overbought");
    }
}
