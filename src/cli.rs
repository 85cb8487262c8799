//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvPriceSource;
use crate::adapters::csv_report::CsvReportWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, Backtest, BacktestConfig, SimulationResult};
use crate::domain::config_validation::{validate_config, validate_parameters};
use crate::domain::error::SwingError;
use crate::domain::indicator::{IndicatorParams, IndicatorRow, IndicatorType};
use crate::domain::metrics::Summary;
use crate::domain::price::{HistoryPeriod, Interval, PriceSeries};
use crate::domain::signal::{current_signal, Signal, SignalThresholds};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

const DEFAULT_TICKER: &str = "PETR4.SA";

#[derive(Parser, Debug)]
#[command(
    name = "swingsim",
    about = "Swing-trade signal generator and paper-trading simulator"
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay price history through the strategy and report profit/loss
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Write the trade ledger to this CSV file
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Write the indicator table to this CSV file
        #[arg(long)]
        indicators: Option<PathBuf>,
    },
    /// Show recent indicator values and the current signal
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Number of recent rows to show
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    #[arg(long)]
    pub ticker: Option<String>,
    /// History period: 1mo, 3mo, 6mo, 1y, 2y, 5y, max
    #[arg(long)]
    pub period: Option<String>,
    /// Bar interval: 1d or 1h
    #[arg(long)]
    pub interval: Option<String>,
    /// RSI window
    #[arg(long)]
    pub window: Option<usize>,
    /// EMA period
    #[arg(long)]
    pub trend: Option<usize>,
    /// Starting capital
    #[arg(long)]
    pub capital: Option<f64>,
}

/// Everything a run needs, resolved from config plus overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub source_dir: PathBuf,
    pub ticker: String,
    pub period: HistoryPeriod,
    pub interval: Interval,
    pub backtest: BacktestConfig,
    pub ledger_path: Option<PathBuf>,
    pub indicators_path: Option<PathBuf>,
}

pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            overrides,
            ledger,
            indicators,
        } => run_simulate(&config, &overrides, ledger, indicators),
        Command::Signal {
            config,
            overrides,
            rows,
        } => run_signal(&config, &overrides, rows),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SwingError> {
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn parse_setting<T>(raw: &str, section: &str, key: &str) -> Result<T, SwingError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|reason| SwingError::invalid(section, key, reason))
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let defaults = BacktestConfig::default();
    BacktestConfig {
        oscillator_window: adapter
            .get_int("strategy", "oscillator_window", defaults.oscillator_window as i64)
            .max(0) as usize,
        trend_period: adapter
            .get_int("strategy", "trend_period", defaults.trend_period as i64)
            .max(0) as usize,
        starting_capital: adapter.get_double(
            "strategy",
            "starting_capital",
            defaults.starting_capital,
        ),
        thresholds: SignalThresholds {
            oversold: adapter.get_double("strategy", "oversold", defaults.thresholds.oversold),
            overbought: adapter.get_double(
                "strategy",
                "overbought",
                defaults.thresholds.overbought,
            ),
        },
    }
}

pub fn build_run_settings(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<RunSettings, SwingError> {
    let ticker = overrides
        .ticker
        .clone()
        .or_else(|| adapter.get_string("data", "ticker"))
        .unwrap_or_else(|| DEFAULT_TICKER.to_string())
        .trim()
        .to_uppercase();
    if ticker.is_empty() {
        return Err(SwingError::invalid("data", "ticker", "ticker must not be empty"));
    }

    let period_raw = overrides
        .period
        .clone()
        .or_else(|| adapter.get_string("data", "period"))
        .unwrap_or_else(|| "3mo".to_string());
    let interval_raw = overrides
        .interval
        .clone()
        .or_else(|| adapter.get_string("data", "interval"))
        .unwrap_or_else(|| "1d".to_string());

    let mut backtest = build_backtest_config(adapter);
    if let Some(window) = overrides.window {
        backtest.oscillator_window = window;
    }
    if let Some(trend) = overrides.trend {
        backtest.trend_period = trend;
    }
    if let Some(capital) = overrides.capital {
        backtest.starting_capital = capital;
    }
    validate_parameters(&backtest)?;

    Ok(RunSettings {
        source_dir: adapter
            .get_string("data", "source_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
        ticker,
        period: parse_setting(&period_raw, "data", "period")?,
        interval: parse_setting(&interval_raw, "data", "interval")?,
        backtest,
        ledger_path: adapter.get_string("report", "ledger_path").map(PathBuf::from),
        indicators_path: adapter
            .get_string("report", "indicators_path")
            .map(PathBuf::from),
    })
}

/// Fetch, build the series and run the backtest.
pub fn run_pipeline(
    source: &dyn PriceSource,
    settings: &RunSettings,
) -> Result<Backtest, SwingError> {
    info!(
        ticker = %settings.ticker,
        period = %settings.period,
        interval = %settings.interval,
        "fetching prices"
    );
    let points = source.fetch_prices(&settings.ticker, settings.period, settings.interval)?;
    let series = PriceSeries::new(settings.ticker.clone(), points)?;

    info!(
        bars = series.len(),
        from = %series.first_timestamp(),
        to = %series.last_timestamp(),
        "running backtest"
    );
    run_backtest(&series, &settings.backtest)
}

pub fn format_summary(ticker: &str, result: &SimulationResult, signal: Signal) -> String {
    let summary = Summary::compute(result);

    let mut out = format!("=== {} ===\n", ticker);
    out.push_str(&format!("Current Signal:   {}\n", signal));
    out.push_str(&format!("Trades:           {}\n", summary.trade_count));
    out.push_str(&format!("Starting Capital: {:.2}\n", result.starting_capital));
    out.push_str(&format!("Final Capital:    {:.2}\n", result.final_capital));
    out.push_str(&format!("Profit/Loss:      {:.2}\n", result.profit_loss));
    out.push_str(&format!("Total Return:     {:.2}%\n", summary.total_return * 100.0));
    out.push_str(&format!("Max Drawdown:     -{:.1}%\n", summary.max_drawdown * 100.0));
    if summary.round_trips > 0 {
        out.push_str(&format!(
            "Round Trips:      {} ({:.1}% won)\n",
            summary.round_trips,
            summary.win_rate * 100.0
        ));
    }
    if let Some(open) = &result.open_position {
        out.push_str(&format!(
            "Open Position:    {} shares @ {:.2}, marked at {:.2} ({:+.2})\n",
            open.holding.shares, open.holding.entry_price, open.mark_price, open.unrealized_pnl
        ));
    }
    out
}

pub fn format_ledger(result: &SimulationResult) -> String {
    result
        .trades
        .iter()
        .map(|trade| format!("  {}  {:<4}  {:.2}\n", trade.timestamp, trade.kind, trade.price))
        .collect()
}

/// The last `count` rows with both indicators defined, headed by the
/// indicator names (e.g. `RSI(14)`, `EMA(20)`).
pub fn format_indicator_table(rows: &[IndicatorRow], params: &IndicatorParams, count: usize) -> String {
    let ready: Vec<&IndicatorRow> = rows.iter().filter(|r| r.is_ready()).collect();
    let start = ready.len().saturating_sub(count);

    let mut out = format!(
        "{:<20}  {:>10}  {:>8}  {:>10}\n",
        "timestamp",
        "close",
        IndicatorType::Rsi(params.oscillator_window).to_string(),
        IndicatorType::Ema(params.trend_period).to_string()
    );
    for row in &ready[start..] {
        out.push_str(&format!(
            "{:<20}  {:>10.2}  {:>8.2}  {:>10.2}\n",
            row.timestamp.to_string(),
            row.close,
            row.oscillator.unwrap_or_default(),
            row.trend.unwrap_or_default()
        ));
    }
    out
}

fn resolve(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<(RunSettings, CsvPriceSource), SwingError> {
    let adapter = load_config(config_path)?;
    let settings = build_run_settings(&adapter, overrides)?;
    let source = CsvPriceSource::new(settings.source_dir.clone());
    Ok((settings, source))
}

fn fail(err: &SwingError) -> ExitCode {
    error!("{err}");
    ExitCode::from(err)
}

fn run_simulate(
    config_path: &Path,
    overrides: &Overrides,
    ledger: Option<PathBuf>,
    indicators: Option<PathBuf>,
) -> ExitCode {
    let (mut settings, source) = match resolve(config_path, overrides) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    if ledger.is_some() {
        settings.ledger_path = ledger;
    }
    if indicators.is_some() {
        settings.indicators_path = indicators;
    }

    match simulate_with(&source, &CsvReportWriter::new(), &settings) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Runs the pipeline, writes any configured reports and returns the console text.
pub fn simulate_with(
    source: &dyn PriceSource,
    report: &dyn ReportPort,
    settings: &RunSettings,
) -> Result<String, SwingError> {
    let backtest = run_pipeline(source, settings)?;
    let signal = current_signal(&backtest.rows, &settings.backtest.thresholds);

    let mut text = format_summary(&settings.ticker, &backtest.result, signal);
    if !backtest.result.trades.is_empty() {
        text.push_str("\nTrades:\n");
        text.push_str(&format_ledger(&backtest.result));
    }

    if let Some(path) = &settings.ledger_path {
        report.write_ledger(&backtest.result, &path.to_string_lossy())?;
        info!(path = %path.display(), "ledger written");
    }
    if let Some(path) = &settings.indicators_path {
        report.write_indicators(&backtest.rows, &path.to_string_lossy())?;
        info!(path = %path.display(), "indicator table written");
    }
    Ok(text)
}

/// Recent indicator table plus the current signal.
pub fn signal_with(
    source: &dyn PriceSource,
    settings: &RunSettings,
    rows: usize,
) -> Result<String, SwingError> {
    let backtest = run_pipeline(source, settings)?;
    let signal = current_signal(&backtest.rows, &settings.backtest.thresholds);

    let mut text = format_indicator_table(&backtest.rows, &settings.backtest.indicator_params(), rows);
    text.push_str(&format!("\nCurrent Signal: {}\n", signal));
    Ok(text)
}

fn run_signal(config_path: &Path, overrides: &Overrides, rows: usize) -> ExitCode {
    let result =
        resolve(config_path, overrides).and_then(|(settings, source)| signal_with(&source, &settings, rows));
    match result {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let result = load_config(config_path)
        .and_then(|adapter| build_run_settings(&adapter, &Overrides::default()));
    match result {
        Ok(settings) => {
            println!("ticker:            {}", settings.ticker);
            println!("period:            {}", settings.period);
            println!("interval:          {}", settings.interval);
            println!("oscillator_window: {}", settings.backtest.oscillator_window);
            println!("trend_period:      {}", settings.backtest.trend_period);
            println!("starting_capital:  {:.2}", settings.backtest.starting_capital);
            println!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_with_overrides() {
        let cli = Cli::try_parse_from([
            "swingsim",
            "simulate",
            "--config",
            "cfg.ini",
            "--ticker",
            "VALE3.SA",
            "--window",
            "9",
            "--capital",
            "5000",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate { overrides, .. } => {
                assert_eq!(overrides.ticker.as_deref(), Some("VALE3.SA"));
                assert_eq!(overrides.window, Some(9));
                assert_eq!(overrides.capital, Some(5000.0));
                assert_eq!(overrides.trend, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn signal_rows_default() {
        let cli = Cli::try_parse_from(["swingsim", "signal", "-c", "cfg.ini"]).unwrap();
        match cli.command {
            Command::Signal { rows, .. } => assert_eq!(rows, 10),
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn sample_result() -> SimulationResult {
        use crate::domain::backtest::OpenPosition;
        use crate::domain::position::{Holding, TradeEvent, TradeKind};
        use chrono::NaiveDate;

        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let holding = Holding {
            shares: 20,
            entry_price: 50.0,
            entry_time: day(2),
        };
        SimulationResult {
            starting_capital: 1000.0,
            final_capital: 0.0,
            trades: vec![TradeEvent {
                timestamp: day(2),
                kind: TradeKind::Buy,
                price: 50.0,
            }],
            profit_loss: 150.0,
            open_position: Some(OpenPosition {
                holding,
                mark_price: 57.5,
                market_value: 1150.0,
                unrealized_pnl: 150.0,
            }),
            round_trips: vec![],
            equity_curve: vec![],
        }
    }

    #[test]
    fn summary_lists_every_line() {
        let text = format_summary("PETR4.SA", &sample_result(), Signal::Wait);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "=== PETR4.SA ===");
        assert_eq!(lines[1], "Current Signal:   WAIT");
        assert_eq!(lines[2], "Trades:           1");
        assert_eq!(lines[5], "Profit/Loss:      150.00");
        assert_eq!(lines[6], "Total Return:     15.00%");
        assert_eq!(
            lines[8],
            "Open Position:    20 shares @ 50.00, marked at 57.50 (+150.00)"
        );
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn ledger_has_one_line_per_trade() {
        let text = format_ledger(&sample_result());
        assert_eq!(text, "  2024-01-02 00:00:00  BUY   50.00\n");
    }

    #[test]
    fn indicator_table_is_headed_by_indicator_names() {
        let params = IndicatorParams {
            oscillator_window: 9,
            trend_period: 21,
        };
        let text = format_indicator_table(&[], &params, 5);
        assert!(text.starts_with("timestamp"));
        assert!(text.contains("RSI(9)"));
        assert!(text.contains("EMA(21)"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["swingsim", "validate", "-c", "cfg.ini", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
