//! Price sanitation and the indicator pipeline that joins RSI and EMA into rows.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::error::SwingError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::{IndicatorParams, IndicatorRow, IndicatorSeries};
use crate::domain::price::PriceSeries;

/// A bar whose close is guaranteed present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanBar {
    pub timestamp: NaiveDateTime,
    pub close: f64,
}

/// Forward-fills missing closes, then backward-fills the leading gap.
///
/// Fails only when the series has no usable close at all.
pub fn sanitize_closes(series: &PriceSeries) -> Result<Vec<CleanBar>, SwingError> {
    let points = series.points();
    let first_known = points
        .iter()
        .find_map(|p| p.usable_close())
        .ok_or(SwingError::NoUsablePrices)?;

    let mut filled = 0usize;
    let mut last = first_known;
    let bars = points
        .iter()
        .map(|p| {
            let close = match p.usable_close() {
                Some(c) => {
                    last = c;
                    c
                }
                None => {
                    filled += 1;
                    last
                }
            };
            CleanBar {
                timestamp: p.timestamp,
                close,
            }
        })
        .collect();

    if filled > 0 {
        debug!(ticker = series.ticker(), filled, "filled missing closes");
    }
    Ok(bars)
}

/// Sanitizes the series once and computes both indicators over the result.
pub fn compute_indicators(
    series: &PriceSeries,
    params: &IndicatorParams,
) -> Result<Vec<IndicatorRow>, SwingError> {
    if params.oscillator_window < 2 {
        return Err(SwingError::invalid(
            "strategy",
            "oscillator_window",
            "must be at least 2",
        ));
    }
    if params.trend_period < 1 {
        return Err(SwingError::invalid(
            "strategy",
            "trend_period",
            "must be at least 1",
        ));
    }

    let bars = sanitize_closes(series)?;
    let rsi = calculate_rsi(&bars, params.oscillator_window);
    let ema = calculate_ema(&bars, params.trend_period);
    debug!(
        ticker = series.ticker(),
        oscillator = %rsi.indicator_type,
        trend = %ema.indicator_type,
        bars = bars.len(),
        defined = rsi.values.iter().filter(|p| p.valid).count(),
        "computed indicators"
    );

    Ok(join_rows(&bars, &rsi, &ema))
}

fn join_rows(bars: &[CleanBar], rsi: &IndicatorSeries, ema: &IndicatorSeries) -> Vec<IndicatorRow> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            timestamp: bar.timestamp,
            close: bar.close,
            oscillator: rsi.values.get(i).and_then(|p| p.scalar()),
            trend: ema.values.get(i).and_then(|p| p.scalar()),
        })
        .collect()
}
