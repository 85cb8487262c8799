//! Price history port trait.

use crate::domain::error::SwingError;
use crate::domain::price::{HistoryPeriod, Interval, PricePoint};

/// Source of historical closing prices for a single ticker.
///
/// An unknown ticker or an empty window is an `Ok` empty vector; callers
/// turn that into `SwingError::EmptyInput` when they build a `PriceSeries`.
pub trait PriceSource {
    fn fetch_prices(
        &self,
        ticker: &str,
        period: HistoryPeriod,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, SwingError>;
}
