//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: A computed value, either a plain scalar or a packed container
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//! - `IndicatorRow`: One bar joined with both indicators, as consumed by the signal evaluator

pub mod ema;
pub mod rsi;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    /// Container-shaped output; only a single-element pack is a usable scalar.
    Packed(Vec<f64>),
}

impl IndicatorValue {
    /// Collapses a single-element pack into `Simple`. Any other value is
    /// returned unchanged.
    pub fn coerce_scalar(self) -> IndicatorValue {
        match self {
            IndicatorValue::Packed(values) if values.len() == 1 => {
                IndicatorValue::Simple(values[0])
            }
            other => other,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            IndicatorValue::Packed(_) => None,
        }
    }
}

impl IndicatorPoint {
    /// The point's value as a plain scalar, or `None` if it is invalid or
    /// cannot be reduced to one.
    pub fn scalar(&self) -> Option<f64> {
        if !self.valid {
            return None;
        }
        self.value.clone().coerce_scalar().as_scalar()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Ema(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
        }
    }
}

/// Window lengths for the two indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub oscillator_window: usize,
    pub trend_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            oscillator_window: 14,
            trend_period: 20,
        }
    }
}

/// One bar of the sanitized series joined with its indicator values.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub oscillator: Option<f64>,
    pub trend: Option<f64>,
}

/// Plain scalar inputs to the signal rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub close: f64,
    pub oscillator: f64,
    pub trend: f64,
}

impl IndicatorRow {
    /// Scalar readings, available only when both indicators are defined.
    pub fn readings(&self) -> Option<Readings> {
        Some(Readings {
            close: self.close,
            oscillator: self.oscillator?,
            trend: self.trend?,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.oscillator.is_some() && self.trend.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Ema(20).to_string(), "EMA(20)");
    }

    #[test]
    fn coerce_single_element_pack() {
        let v = IndicatorValue::Packed(vec![42.5]).coerce_scalar();
        assert_eq!(v, IndicatorValue::Simple(42.5));
    }

    #[test]
    fn coerce_leaves_other_values_unchanged() {
        let multi = IndicatorValue::Packed(vec![1.0, 2.0]);
        assert_eq!(multi.clone().coerce_scalar(), multi);

        let empty = IndicatorValue::Packed(vec![]);
        assert_eq!(empty.clone().coerce_scalar(), empty);

        let simple = IndicatorValue::Simple(3.0);
        assert_eq!(simple.clone().coerce_scalar(), simple);
    }

    #[test]
    fn point_scalar_respects_validity() {
        let valid = IndicatorPoint {
            timestamp: ts(),
            valid: true,
            value: IndicatorValue::Packed(vec![55.0]),
        };
        assert_eq!(valid.scalar(), Some(55.0));

        let invalid = IndicatorPoint {
            valid: false,
            ..valid.clone()
        };
        assert_eq!(invalid.scalar(), None);

        let unpackable = IndicatorPoint {
            value: IndicatorValue::Packed(vec![1.0, 2.0]),
            ..valid
        };
        assert_eq!(unpackable.scalar(), None);
    }

    #[test]
    fn readings_need_both_indicators() {
        let row = IndicatorRow {
            timestamp: ts(),
            close: 105.0,
            oscillator: Some(25.0),
            trend: Some(100.0),
        };
        assert!(row.is_ready());
        assert_eq!(
            row.readings(),
            Some(Readings {
                close: 105.0,
                oscillator: 25.0,
                trend: 100.0
            })
        );

        let warming = IndicatorRow {
            oscillator: None,
            ..row
        };
        assert!(!warming.is_ready());
        assert_eq!(warming.readings(), None);
    }

    #[test]
    fn default_params() {
        let p = IndicatorParams::default();
        assert_eq!(p.oscillator_window, 14);
        assert_eq!(p.trend_period, 20);
    }
}
