#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use swingsim::domain::error::SwingError;
use swingsim::domain::indicator::IndicatorRow;
use swingsim::domain::price::{HistoryPeriod, Interval, PricePoint, PriceSeries};
use swingsim::ports::data_port::PriceSource;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        ticker: &str,
        _period: HistoryPeriod,
        _interval: Interval,
    ) -> Result<Vec<PricePoint>, SwingError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SwingError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn ts(day: u32) -> NaiveDateTime {
    day_offset(day as i64 - 1)
}

pub fn day_offset(days: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(days)
}

pub fn points(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(day_offset(i as i64), c))
        .collect()
}

pub fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", points(closes)).unwrap()
}

pub fn ready_row(day: u32, close: f64, oscillator: f64, trend: f64) -> IndicatorRow {
    IndicatorRow {
        timestamp: ts(day),
        close,
        oscillator: Some(oscillator),
        trend: Some(trend),
    }
}

/// Falls hard then rebounds: a drawdown that pulls RSI under 30 while the
/// first up-day closes back above a fast EMA, then a rally that pushes RSI
/// over 70.
pub fn dip_and_rally() -> Vec<f64> {
    vec![
        100.0, 96.0, 92.0, 88.0, 84.0, 80.0, 76.0, 72.0, 74.5, 77.0, 80.0, 84.0, 88.0, 93.0,
        98.0, 104.0,
    ]
}
