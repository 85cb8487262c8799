//! CSV report adapter implementing ReportPort.
//!
//! Writes the trade ledger (`timestamp,kind,price`) and the indicator table
//! (`timestamp,close,oscillator,trend`, undefined values left empty).

use std::path::Path;

use crate::domain::backtest::SimulationResult;
use crate::domain::error::SwingError;
use crate::domain::indicator::IndicatorRow;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    pub fn new() -> Self {
        CsvReportWriter
    }
}

fn report_err(path: &str, e: impl std::fmt::Display) -> SwingError {
    SwingError::Report {
        reason: format!("failed to write {}: {}", path, e),
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

impl ReportPort for CsvReportWriter {
    fn write_ledger(&self, result: &SimulationResult, output_path: &str) -> Result<(), SwingError> {
        let mut wtr =
            csv::Writer::from_path(Path::new(output_path)).map_err(|e| report_err(output_path, e))?;

        wtr.write_record(["timestamp", "kind", "price"])
            .map_err(|e| report_err(output_path, e))?;
        for trade in &result.trades {
            wtr.write_record([
                format_timestamp(trade.timestamp),
                trade.kind.to_string(),
                format!("{:.4}", trade.price),
            ])
            .map_err(|e| report_err(output_path, e))?;
        }
        wtr.flush().map_err(|e| report_err(output_path, e))?;
        Ok(())
    }

    fn write_indicators(&self, rows: &[IndicatorRow], output_path: &str) -> Result<(), SwingError> {
        let mut wtr =
            csv::Writer::from_path(Path::new(output_path)).map_err(|e| report_err(output_path, e))?;

        wtr.write_record(["timestamp", "close", "oscillator", "trend"])
            .map_err(|e| report_err(output_path, e))?;
        for row in rows {
            wtr.write_record([
                format_timestamp(row.timestamp),
                format!("{:.4}", row.close),
                format_optional(row.oscillator),
                format_optional(row.trend),
            ])
            .map_err(|e| report_err(output_path, e))?;
        }
        wtr.flush().map_err(|e| report_err(output_path, e))?;
        Ok(())
    }
}
