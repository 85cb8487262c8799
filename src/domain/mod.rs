//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
