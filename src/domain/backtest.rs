//! Simulation driver: a day-by-day fold of the enriched series through the
//! signal generator and a run-local ledger.

use chrono::NaiveDate;
use log::{debug, info};

use super::error::StockPulseError;
use super::execution::{fixed_fraction_shares, risk_based_shares, RiskParams};
use super::indicator_helpers::{enrich, IndicatorConfig, IndicatorRow};
use super::metrics::Metrics;
use super::ohlcv::{is_chronological, PricePoint};
use super::portfolio::{EntryResult, Ledger};
use super::position::Trade;
use super::sentiment::{forward_fill, SentimentPoint};
use super::signal::{sentiment_signal, technical_signal};
use super::strategy::{SignalMode, SignalParams};

/// Everything a run needs besides the data and the signal mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub initial_capital: f64,
    pub risk: RiskParams,
    pub indicators: IndicatorConfig,
    pub signal: SignalParams,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            initial_capital: 10_000.0,
            risk: RiskParams::default(),
            indicators: IndicatorConfig::default(),
            signal: SignalParams::default(),
        }
    }
}

/// One recorded step, taken after the day's order (if any) was executed.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: f64,
    pub cash: f64,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub symbol: String,
    pub strategy: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// `None` for sentiment runs.
    pub win_rate: Option<f64>,
    pub trade_count: usize,
    pub trades: Vec<Trade>,
    pub history: Vec<HistoryPoint>,
}

impl SimulationResult {
    /// Zeroed result for a run with no price data.
    pub fn empty(symbol: &str, mode: &SignalMode, initial_capital: f64) -> Self {
        let metrics = Metrics::compute(&[], &[], !mode.is_sentiment());
        SimulationResult {
            symbol: symbol.to_string(),
            strategy: mode.label(),
            initial_capital,
            final_value: initial_capital,
            total_return: metrics.total_return,
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown: metrics.max_drawdown,
            win_rate: metrics.win_rate,
            trade_count: 0,
            trades: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn final_cash(&self) -> f64 {
        self.history
            .last()
            .map_or(self.initial_capital, |h| h.cash)
    }

    pub fn values(&self) -> Vec<f64> {
        self.history.iter().map(|h| h.portfolio_value).collect()
    }

    pub fn signals(&self) -> Vec<f64> {
        self.history.iter().map(|h| h.signal).collect()
    }

    pub fn total_return_pct(&self) -> f64 {
        self.total_return * 100.0
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.max_drawdown * 100.0
    }

    pub fn win_rate_pct(&self) -> Option<f64> {
        self.win_rate.map(|w| w * 100.0)
    }
}

/// Simulate `mode` over `prices` for a single symbol.
///
/// Rows whose indicators are still warming up produce a zero signal but are
/// recorded. Open positions are not liquidated at the end; the final value
/// marks them at the last close.
pub fn simulate(
    symbol: &str,
    prices: &[PricePoint],
    mode: &SignalMode,
    params: &SimulationParams,
) -> Result<SimulationResult, StockPulseError> {
    if prices.is_empty() {
        info!("{symbol}: no price data, returning empty result");
        return Ok(SimulationResult::empty(symbol, mode, params.initial_capital));
    }
    if !is_chronological(prices) {
        return Err(StockPulseError::Data {
            reason: format!("{symbol}: price dates are not strictly increasing"),
        });
    }

    info!(
        "{symbol}: simulating {} over {} sessions ({} to {})",
        mode.label(),
        prices.len(),
        prices[0].date,
        prices[prices.len() - 1].date,
    );

    let rows = enrich(prices, &params.indicators);
    let sentiment: Vec<Option<SentimentPoint>> = match mode {
        SignalMode::Sentiment(points) => forward_fill(prices, points),
        SignalMode::Technical(_) => vec![None; prices.len()],
    };

    let mut ledger = Ledger::new(params.initial_capital);
    let mut history = Vec::with_capacity(rows.len());
    let mut warmup_rows = 0usize;

    for (row, sentiment) in rows.iter().zip(&sentiment) {
        if !row.is_complete() {
            warmup_rows += 1;
        }

        let signal = match mode {
            SignalMode::Technical(kind) => technical_signal(*kind, row, &params.signal),
            SignalMode::Sentiment(_) => sentiment_signal(row, sentiment.as_ref(), &params.signal),
        };

        step(&mut ledger, symbol, row, signal, mode, &params.risk)?;

        let close = row.close();
        let portfolio_value = ledger.mark_to_market(|s| (s == symbol).then_some(close))?;
        history.push(HistoryPoint {
            date: row.date(),
            close,
            signal,
            cash: ledger.cash(),
            portfolio_value,
        });
    }
    debug!("{symbol}: {warmup_rows} warm-up rows with incomplete indicators");

    let values: Vec<f64> = history.iter().map(|h| h.portfolio_value).collect();
    let trades = ledger.into_trades();
    let metrics = Metrics::compute(&values, &trades, !mode.is_sentiment());
    let final_value = values.last().copied().unwrap_or(params.initial_capital);

    info!(
        "{symbol}: finished with {} trades, final value {final_value:.2} ({:+.2}%)",
        trades.len(),
        metrics.total_return * 100.0,
    );

    Ok(SimulationResult {
        symbol: symbol.to_string(),
        strategy: mode.label(),
        initial_capital: params.initial_capital,
        final_value,
        total_return: metrics.total_return,
        sharpe_ratio: metrics.sharpe_ratio,
        max_drawdown: metrics.max_drawdown,
        win_rate: metrics.win_rate,
        trade_count: metrics.trade_count,
        trades,
        history,
    })
}

/// Act on one day's signal: buy on a positive signal while cash remains,
/// fully exit on a negative one while a position is held.
fn step(
    ledger: &mut Ledger,
    symbol: &str,
    row: &IndicatorRow,
    signal: f64,
    mode: &SignalMode,
    risk: &RiskParams,
) -> Result<(), StockPulseError> {
    let close = row.close();

    if signal > 0.0 && ledger.cash() > 0.0 {
        let shares = match mode {
            SignalMode::Technical(_) => risk_based_shares(ledger.cash(), close, row.atr, risk),
            SignalMode::Sentiment(_) => fixed_fraction_shares(ledger.cash(), close, risk),
        };
        if shares <= 0.0 {
            debug!("{}: signal {signal:.3} but zero shares affordable", row.date());
            return Ok(());
        }
        if let EntryResult::Filled { shares, cost, .. } = ledger.buy(symbol, shares, close, row.date()) {
            debug!("{}: bought {shares:.4} {symbol} for {cost:.2}", row.date());
        }
    } else if signal < 0.0 && ledger.has_position(symbol) {
        let trade = ledger.close_position(symbol, close, row.date())?;
        debug!("{}: sold {:.4} {symbol} for {:.2}", row.date(), trade.shares, trade.value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::StrategyKind;
    use approx::assert_abs_diff_eq;

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1_000,
            })
            .collect()
    }

    fn technical(kind: StrategyKind) -> SignalMode {
        SignalMode::Technical(kind)
    }

    #[test]
    fn empty_prices_give_empty_result() {
        let params = SimulationParams::default();
        let result = simulate("AAPL", &[], &technical(StrategyKind::MaCrossover), &params).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.final_value, 10_000.0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.win_rate, Some(0.0));
        assert_eq!(result.strategy, "ma_crossover");
    }

    #[test]
    fn empty_sentiment_result_has_no_win_rate() {
        let params = SimulationParams::default();
        let result = simulate("AAPL", &[], &SignalMode::Sentiment(Vec::new()), &params).unwrap();
        assert_eq!(result.win_rate, None);
        assert_eq!(result.win_rate_pct(), None);
        assert_eq!(result.strategy, "sentiment");
    }

    #[test]
    fn unsorted_prices_are_rejected() {
        let mut prices = series(&[100.0, 101.0, 102.0]);
        prices.swap(0, 2);
        let err = simulate(
            "AAPL",
            &prices,
            &technical(StrategyKind::Rsi),
            &SimulationParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StockPulseError::Data { .. }));
    }

    #[test]
    fn warmup_rows_are_recorded_with_zero_signal() {
        let prices = series(&[100.0; 10]);
        let result = simulate(
            "AAPL",
            &prices,
            &technical(StrategyKind::MaCrossover),
            &SimulationParams::default(),
        )
        .unwrap();
        assert_eq!(result.history.len(), 10);
        assert!(result.signals().iter().all(|&s| s == 0.0));
        assert_eq!(result.final_value, 10_000.0);
    }

    #[test]
    fn rising_series_buys_and_gains() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let result = simulate(
            "AAPL",
            &series(&closes),
            &technical(StrategyKind::MaCrossover),
            &SimulationParams::default(),
        )
        .unwrap();
        assert!(result.trades.iter().any(Trade::is_buy));
        assert!(result.final_value > result.initial_capital);
        assert_abs_diff_eq!(
            result.total_return,
            result.final_value / result.initial_capital - 1.0,
            epsilon = 1e-12
        );
        assert!(result.history.iter().all(|h| h.cash >= 0.0));
    }

    #[test]
    fn percentage_helpers_scale_fractions() {
        let mut result = SimulationResult::empty(
            "AAPL",
            &technical(StrategyKind::Macd),
            1_000.0,
        );
        result.total_return = 0.125;
        result.max_drawdown = -0.05;
        result.win_rate = Some(0.5);
        assert_abs_diff_eq!(result.total_return_pct(), 12.5, epsilon = 1e-12);
        assert_abs_diff_eq!(result.max_drawdown_pct(), -5.0, epsilon = 1e-12);
        assert_eq!(result.win_rate_pct(), Some(50.0));
        assert_eq!(result.final_cash(), 1_000.0);
    }
}
