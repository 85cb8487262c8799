//! Summary statistics over a simulation result.

use super::backtest::{EquityPoint, SimulationResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub trade_count: usize,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub holding_open: bool,
}

impl Summary {
    pub fn compute(result: &SimulationResult) -> Self {
        let trades_won = result.round_trips.iter().filter(|t| t.pnl > 0.0).count();
        let trades_lost = result.round_trips.iter().filter(|t| t.pnl < 0.0).count();
        let round_trips = result.round_trips.len();

        let win_rate = if round_trips > 0 {
            trades_won as f64 / round_trips as f64
        } else {
            0.0
        };

        let total_return = if result.starting_capital > 0.0 {
            result.profit_loss / result.starting_capital
        } else {
            0.0
        };

        Summary {
            trade_count: result.trades.len(),
            round_trips,
            trades_won,
            trades_lost,
            win_rate,
            total_return,
            max_drawdown: max_drawdown(&result.equity_curve),
            holding_open: result.open_position.is_some(),
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            worst = worst.max((peak - point.equity) / peak);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{RoundTrip, TradeEvent, TradeKind};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: ts(i as u32 + 1),
                equity,
            })
            .collect()
    }

    fn trip(pnl: f64) -> RoundTrip {
        RoundTrip {
            shares: 10,
            entry_price: 10.0,
            exit_price: 10.0 + pnl / 10.0,
            entry_time: ts(1),
            exit_time: ts(2),
            pnl,
        }
    }

    fn event(day: u32, kind: TradeKind) -> TradeEvent {
        TradeEvent {
            timestamp: ts(day),
            kind,
            price: 10.0,
        }
    }

    #[test]
    fn drawdown_empty_curve() {
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn drawdown_monotonic_rise() {
        assert_eq!(max_drawdown(&curve(&[100.0, 110.0, 120.0])), 0.0);
    }

    #[test]
    fn drawdown_peak_to_trough() {
        let dd = max_drawdown(&curve(&[100.0, 120.0, 90.0, 110.0, 100.0]));
        assert!((dd - 0.25).abs() < 1e-12);
    }

    #[test]
    fn summary_counts_wins_and_losses() {
        let result = SimulationResult {
            starting_capital: 1000.0,
            final_capital: 1050.0,
            trades: vec![
                event(1, TradeKind::Buy),
                event(2, TradeKind::Sell),
                event(3, TradeKind::Buy),
                event(4, TradeKind::Sell),
                event(5, TradeKind::Buy),
                event(6, TradeKind::Sell),
            ],
            profit_loss: 50.0,
            open_position: None,
            round_trips: vec![trip(80.0), trip(-40.0), trip(10.0)],
            equity_curve: curve(&[1000.0, 1080.0, 1040.0, 1050.0]),
        };

        let s = Summary::compute(&result);
        assert_eq!(s.trade_count, 6);
        assert_eq!(s.round_trips, 3);
        assert_eq!(s.trades_won, 2);
        assert_eq!(s.trades_lost, 1);
        assert!((s.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.total_return - 0.05).abs() < 1e-12);
        assert!(!s.holding_open);
        assert!(s.max_drawdown > 0.0);
    }

    #[test]
    fn summary_of_idle_result() {
        let result = SimulationResult {
            starting_capital: 1000.0,
            final_capital: 1000.0,
            trades: vec![],
            profit_loss: 0.0,
            open_position: None,
            round_trips: vec![],
            equity_curve: vec![],
        };
        let s = Summary::compute(&result);
        assert_eq!(s.trade_count, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.total_return, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
    }
}
