//! Price bars, validated price series and history request parameters.

use chrono::{Duration, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

use super::error::SwingError;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            close: Some(close),
        }
    }

    pub fn missing(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            close: None,
        }
    }

    /// The close if it is a finite positive price, otherwise `None`.
    pub fn usable_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite() && *c > 0.0)
    }
}

/// Non-empty, strictly chronological sequence of price points.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SwingError> {
        let ticker = ticker.into();
        if points.is_empty() {
            return Err(SwingError::EmptyInput { ticker });
        }
        if let Some(i) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SwingError::UnorderedSeries { index: i + 1 });
        }
        Ok(Self { ticker, points })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.points[0].timestamp
    }

    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.points[self.points.len() - 1].timestamp
    }
}

/// Lookback window requested from a price source, counted back from the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl HistoryPeriod {
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            HistoryPeriod::OneMonth => Some(Duration::days(30)),
            HistoryPeriod::ThreeMonths => Some(Duration::days(91)),
            HistoryPeriod::SixMonths => Some(Duration::days(182)),
            HistoryPeriod::OneYear => Some(Duration::days(365)),
            HistoryPeriod::TwoYears => Some(Duration::days(730)),
            HistoryPeriod::FiveYears => Some(Duration::days(1826)),
            HistoryPeriod::Max => None,
        }
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(HistoryPeriod::OneMonth),
            "3mo" => Ok(HistoryPeriod::ThreeMonths),
            "6mo" => Ok(HistoryPeriod::SixMonths),
            "1y" => Ok(HistoryPeriod::OneYear),
            "2y" => Ok(HistoryPeriod::TwoYears),
            "5y" => Ok(HistoryPeriod::FiveYears),
            "max" => Ok(HistoryPeriod::Max),
            other => Err(format!(
                "unknown period '{other}' (expected 1mo, 3mo, 6mo, 1y, 2y, 5y or max)"
            )),
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::Max => "max",
        };
        write!(f, "{s}")
    }
}

/// Sampling interval of the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Hourly,
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1h" => Ok(Interval::Hourly),
            other => Err(format!("unknown interval '{other}' (expected 1d or 1h)")),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "1d"),
            Interval::Hourly => write!(f, "1h"),
        }
    }
}
