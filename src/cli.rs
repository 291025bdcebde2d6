//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{simulate, HistoryPoint, SimulationParams, SimulationResult};
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::error::StockPulseError;
use crate::domain::execution::RiskParams;
use crate::domain::indicator_helpers::{enrich, IndicatorConfig, IndicatorRow};
use crate::domain::position::Trade;
use crate::domain::strategy::{SignalMode, SignalParams, StrategyKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::{PriceSource, SentimentSource};

#[derive(Parser, Debug)]
#[command(name = "stockpulse", about = "Single-symbol stock strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a strategy over a symbol's price history
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// ma_crossover, rsi or macd (ignored with --sentiment)
        #[arg(short, long)]
        strategy: Option<String>,
        /// Blend the MA trend with news sentiment
        #[arg(long)]
        sentiment: bool,
        /// Print the trade log as CSV on stdout
        #[arg(long)]
        trades: bool,
        /// Print the daily value history as CSV on stdout
        #[arg(long)]
        history: bool,
    },
    /// Print the indicator-enriched price series as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            symbol,
            strategy,
            sentiment,
            trades,
            history,
        } => run_simulate(
            &config,
            symbol.as_deref(),
            strategy.as_deref(),
            sentiment,
            trades,
            history,
        ),
        Command::Indicators { config, symbol } => run_indicators(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &StockPulseError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| fail(&e))?;
    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

fn run_simulate(
    config_path: &Path,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    use_sentiment: bool,
    print_trades: bool,
    print_history: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let kind = match resolve_strategy(strategy_override, &adapter) {
        Ok(k) => k,
        Err(e) => return fail(&e),
    };
    let params = match build_simulation_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let (start, end) = match build_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let source = match build_csv_adapter(&adapter, config_path) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let sentiment_source = use_sentiment.then_some(&source as &dyn SentimentSource);
    let result = match run_simulation_pipeline(
        &source,
        sentiment_source,
        &symbol,
        kind,
        &params,
        start,
        end,
    ) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if result.is_empty() {
        return fail(&StockPulseError::NoData { symbol });
    }

    print_summary(&result);

    let mut out = io::stdout().lock();
    if print_trades {
        if let Err(e) = write_trades(&mut out, &result.trades) {
            return fail(&e);
        }
    }
    if print_history {
        if let Err(e) = write_history(&mut out, &result.history) {
            return fail(&e);
        }
    }
    ExitCode::SUCCESS
}

/// Fetch data for `symbol` and run one simulation. Supplying a sentiment
/// source selects the sentiment-blended mode; otherwise `kind` is used.
pub fn run_simulation_pipeline(
    prices: &dyn PriceSource,
    sentiment: Option<&dyn SentimentSource>,
    symbol: &str,
    kind: StrategyKind,
    params: &SimulationParams,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<SimulationResult, StockPulseError> {
    let series = prices.fetch_prices(symbol, start, end)?;
    eprintln!("Loaded {} sessions for {symbol}", series.len());

    let mode = match sentiment {
        Some(source) => {
            let timeline = source.fetch_sentiment(symbol, start, end)?;
            eprintln!("Loaded {} sentiment observations", timeline.len());
            SignalMode::Sentiment(timeline)
        }
        None => SignalMode::Technical(kind),
    };

    simulate(symbol, &series, &mode, params)
}

fn run_indicators(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbol = match resolve_symbol(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let indicators = match build_indicator_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let (start, end) = match build_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let source = match build_csv_adapter(&adapter, config_path) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let prices = match source.fetch_prices(&symbol, start, end) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if prices.is_empty() {
        return fail(&StockPulseError::NoData { symbol });
    }
    let rows = enrich(&prices, &indicators);

    match write_indicator_rows(&mut io::stdout().lock(), &rows) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let params = match build_simulation_params(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let kind = match resolve_strategy(None, &adapter) {
        Ok(k) => k,
        Err(e) => return fail(&e),
    };

    match adapter.get_string("simulation", "symbol") {
        Some(symbol) => eprintln!("  symbol:          {symbol}"),
        None => eprintln!("  symbol:          (must be given with --symbol)"),
    }
    eprintln!("  strategy:        {kind}");
    eprintln!("  initial capital: {:.2}", params.initial_capital);
    eprintln!(
        "  indicators:      {}",
        params
            .indicators
            .indicator_types()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  warm-up rows:    {}", params.indicators.warmup_len());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

pub fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, StockPulseError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("simulation", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StockPulseError::ConfigMissing {
            section: "simulation".into(),
            key: "symbol".into(),
        })
}

pub fn resolve_strategy(
    strategy_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<StrategyKind, StockPulseError> {
    match strategy_override
        .map(str::to_string)
        .or_else(|| config.get_string("simulation", "strategy"))
    {
        Some(name) => name.parse(),
        None => Ok(StrategyKind::MaCrossover),
    }
}

pub fn build_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), StockPulseError> {
    Ok((
        parse_date(config, "simulation", "start_date")?,
        parse_date(config, "simulation", "end_date")?,
    ))
}

fn period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, StockPulseError> {
    let value = config.get_int("indicators", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| StockPulseError::ConfigInvalid {
            section: "indicators".into(),
            key: key.into(),
            reason: "period must be at least 1".into(),
        })
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, StockPulseError> {
    let d = IndicatorConfig::default();
    Ok(IndicatorConfig {
        sma_fast: period(config, "sma_fast", d.sma_fast)?,
        sma_slow: period(config, "sma_slow", d.sma_slow)?,
        ema_fast: period(config, "ema_fast", d.ema_fast)?,
        ema_slow: period(config, "ema_slow", d.ema_slow)?,
        signal: period(config, "signal", d.signal)?,
        rsi: period(config, "rsi", d.rsi)?,
        atr: period(config, "atr", d.atr)?,
    })
}

pub fn build_simulation_params(config: &dyn ConfigPort) -> Result<SimulationParams, StockPulseError> {
    let risk = RiskParams::default();
    let signal = SignalParams::default();

    Ok(SimulationParams {
        initial_capital: config.get_double("simulation", "initial_capital", 10_000.0),
        risk: RiskParams {
            risk_per_trade: config.get_double("simulation", "risk_per_trade", risk.risk_per_trade),
            max_cash_fraction: config.get_double(
                "simulation",
                "max_cash_fraction",
                risk.max_cash_fraction,
            ),
            sentiment_allocation: config.get_double(
                "simulation",
                "sentiment_allocation",
                risk.sentiment_allocation,
            ),
            fractional_shares: config.get_bool(
                "simulation",
                "fractional_shares",
                risk.fractional_shares,
            ),
        },
        indicators: build_indicator_config(config)?,
        signal: SignalParams {
            rsi_oversold: config.get_double("signal", "rsi_oversold", signal.rsi_oversold),
            rsi_overbought: config.get_double("signal", "rsi_overbought", signal.rsi_overbought),
            ma_weight: config.get_double("signal", "ma_weight", signal.ma_weight),
            sentiment_weight: config.get_double(
                "signal",
                "sentiment_weight",
                signal.sentiment_weight,
            ),
            trend_weight: config.get_double("signal", "trend_weight", signal.trend_weight),
        },
    })
}

/// `[data]` directories; relative paths resolve against the config file's
/// directory.
pub fn build_csv_adapter(
    config: &dyn ConfigPort,
    config_path: &Path,
) -> Result<CsvAdapter, StockPulseError> {
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let resolve = |raw: String| {
        let p = PathBuf::from(raw);
        if p.is_absolute() { p } else { base.join(p) }
    };

    let prices_dir = config
        .get_string("data", "prices_dir")
        .map(resolve)
        .ok_or_else(|| StockPulseError::ConfigMissing {
            section: "data".into(),
            key: "prices_dir".into(),
        })?;

    let adapter = CsvAdapter::new(prices_dir);
    Ok(match config.get_string("data", "sentiment_dir") {
        Some(dir) => adapter.with_sentiment_dir(resolve(dir)),
        None => adapter,
    })
}

pub fn print_summary(result: &SimulationResult) {
    eprintln!("\n=== {} ({}) ===", result.symbol, result.strategy);
    if let (Some(first), Some(last)) = (result.history.first(), result.history.last()) {
        eprintln!("Period:           {} to {}", first.date, last.date);
    }
    eprintln!("Initial Capital:  {:.2}", result.initial_capital);
    eprintln!("Final Value:      {:.2}", result.final_value);
    eprintln!("Total Return:     {:.2}%", result.total_return_pct());
    eprintln!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    eprintln!("Max Drawdown:     {:.2}%", result.max_drawdown_pct());
    eprintln!("Total Trades:     {}", result.trade_count);
    if let Some(win_rate) = result.win_rate_pct() {
        eprintln!("Win Rate:         {win_rate:.1}%");
    }
}

fn csv_error(e: csv::Error) -> StockPulseError {
    StockPulseError::Data {
        reason: format!("CSV write error: {e}"),
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

pub fn write_trades<W: Write>(out: W, trades: &[Trade]) -> Result<(), StockPulseError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "symbol", "side", "shares", "price", "value"])
        .map_err(csv_error)?;
    for t in trades {
        wtr.write_record([
            t.date.to_string(),
            t.symbol.clone(),
            t.side.to_string(),
            format!("{:.6}", t.shares),
            format!("{:.4}", t.price),
            format!("{:.2}", t.value),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_history<W: Write>(out: W, history: &[HistoryPoint]) -> Result<(), StockPulseError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "close", "signal", "cash", "portfolio_value"])
        .map_err(csv_error)?;
    for h in history {
        wtr.write_record([
            h.date.to_string(),
            format!("{:.4}", h.close),
            format!("{:.4}", h.signal),
            format!("{:.2}", h.cash),
            format!("{:.2}", h.portfolio_value),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_indicator_rows<W: Write>(out: W, rows: &[IndicatorRow]) -> Result<(), StockPulseError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "sma_fast",
        "sma_slow",
        "ema_fast",
        "ema_slow",
        "macd",
        "signal_line",
        "rsi",
        "atr",
    ])
    .map_err(csv_error)?;
    for r in rows {
        let p = &r.price;
        wtr.write_record([
            p.date.to_string(),
            p.open.to_string(),
            p.high.to_string(),
            p.low.to_string(),
            p.close.to_string(),
            p.volume.to_string(),
            opt(r.sma_fast),
            opt(r.sma_slow),
            opt(r.ema_fast),
            opt(r.ema_slow),
            opt(r.macd),
            opt(r.signal_line),
            opt(r.rsi),
            opt(r.atr),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}
