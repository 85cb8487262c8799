//! CSV file price source.
//!
//! Reads `<TICKER>_<INTERVAL>.csv` from a base directory. The file needs a
//! timestamp column (`timestamp`, `datetime` or `date`) and a `close` column.
//! Empty, `NaN` or `null` closes are read as missing.

use crate::domain::error::SwingError;
use crate::domain::price::{HistoryPeriod, Interval, PricePoint};
use crate::ports::data_port::PriceSource;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use tracing::debug;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, interval))
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_close(raw: &str) -> Result<Option<f64>, SwingError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| SwingError::DataSource {
            reason: format!("invalid close value '{}': {}", raw, e),
        })
}

fn column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

impl PriceSource for CsvPriceSource {
    fn fetch_prices(
        &self,
        ticker: &str,
        period: HistoryPeriod,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, SwingError> {
        if !self.base_path.is_dir() {
            return Err(SwingError::DataSource {
                reason: format!("data directory {} does not exist", self.base_path.display()),
            });
        }

        let path = self.csv_path(ticker, interval);
        if !path.exists() {
            debug!(path = %path.display(), "no price file for ticker");
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| SwingError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| SwingError::DataSource {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let ts_col = column(&headers, &["timestamp", "datetime", "date"]).ok_or_else(|| {
            SwingError::DataSource {
                reason: "missing timestamp column".into(),
            }
        })?;
        let close_col = column(&headers, &["close"]).ok_or_else(|| SwingError::DataSource {
            reason: "missing close column".into(),
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SwingError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(ts_col).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| SwingError::DataSource {
                reason: format!("invalid timestamp '{}'", raw_ts),
            })?;
            let close = parse_close(record.get(close_col).unwrap_or_default())?;

            points.push(PricePoint { timestamp, close });
        }

        points.sort_by_key(|p| p.timestamp);

        if let Some(lookback) = period.lookback() {
            if let Some(cutoff) = points.last().map(|p| p.timestamp - lookback) {
                points.retain(|p| p.timestamp >= cutoff);
            }
        }

        debug!(ticker, %period, %interval, bars = points.len(), "loaded prices");
        Ok(points)
    }
}
