//! Performance metrics over a recorded value series and trade log.

use super::position::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Return spreads at or below this are treated as zero variance.
const MIN_STDDEV: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline as a non-positive fraction.
    pub max_drawdown: f64,
    /// Only computed for price-only runs.
    pub win_rate: Option<f64>,
    pub trade_count: usize,
    pub sell_count: usize,
}

impl Metrics {
    pub fn compute(values: &[f64], trades: &[Trade], with_win_rate: bool) -> Self {
        let returns = daily_returns(values);
        Metrics {
            total_return: total_return(values),
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown: max_drawdown(values),
            win_rate: with_win_rate.then(|| win_rate(trades)),
            trade_count: trades.len(),
            sell_count: trades.iter().filter(|t| t.is_sell()).count(),
        }
    }
}

/// V[i]/V[i-1] - 1 for i in 1..n. A non-positive previous value gives 0.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// V[n-1]/V[0] - 1; 0 for an empty series or a non-positive start.
pub fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Annualised mean/stddev of daily returns (population stddev).
///
/// 0 when fewer than two returns exist or the returns are (numerically) constant.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > MIN_STDDEV && stddev.is_finite() {
        TRADING_DAYS_PER_YEAR.sqrt() * mean / stddev
    } else {
        0.0
    }
}

/// min over i of V[i]/max(V[0..=i]) - 1. Always ≤ 0; 0 for an empty series.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            worst = worst.min(v / peak - 1.0);
        }
    }

    worst
}

/// Fraction of sells priced above the most recent earlier buy of the same
/// symbol. Only buys dated strictly before the sell count; a sell with no
/// such buy is not profitable. 0 when there are no sells.
pub fn win_rate(trades: &[Trade]) -> f64 {
    let sells: Vec<&Trade> = trades.iter().filter(|t| t.is_sell()).collect();
    if sells.is_empty() {
        return 0.0;
    }

    let profitable = sells
        .iter()
        .filter(|sell| {
            trades
                .iter()
                .rev()
                .find(|t| t.is_buy() && t.symbol == sell.symbol && t.date < sell.date)
                .is_some_and(|buy| sell.price > buy.price)
        })
        .count();

    profitable as f64 / sells.len() as f64
}
