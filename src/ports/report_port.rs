//! Report generation port trait.

use crate::domain::backtest::SimulationResult;
use crate::domain::error::SwingError;
use crate::domain::indicator::IndicatorRow;

/// Port for exporting backtest output.
pub trait ReportPort {
    fn write_ledger(&self, result: &SimulationResult, output_path: &str) -> Result<(), SwingError>;

    fn write_indicators(&self, rows: &[IndicatorRow], output_path: &str) -> Result<(), SwingError>;
}
