//! Signal generation: one enriched row in, one advisory value in [-1, 1] out.
//!
//! A rule whose inputs are undefined on a row (warm-up) yields exactly 0.

use super::indicator_helpers::IndicatorRow;
use super::sentiment::SentimentPoint;
use super::strategy::{SignalParams, StrategyKind};

/// Price-only signal for `kind`.
pub fn technical_signal(kind: StrategyKind, row: &IndicatorRow, params: &SignalParams) -> f64 {
    let raw = match kind {
        StrategyKind::MaCrossover => match (row.sma_fast, row.sma_slow) {
            (Some(fast), Some(slow)) => ma_crossover(fast, slow),
            _ => return 0.0,
        },
        StrategyKind::Rsi => match row.rsi {
            Some(rsi) if rsi < params.rsi_oversold => 1.0,
            Some(rsi) if rsi > params.rsi_overbought => -1.0,
            _ => 0.0,
        },
        StrategyKind::Macd => match (row.macd, row.signal_line) {
            (Some(macd), Some(signal)) => {
                let base = if macd > signal { 0.5 } else { -0.5 };
                base * (1.0 + (macd - signal).abs())
            }
            _ => return 0.0,
        },
    };
    clamp_signal(raw)
}

/// MA trend blended with the current and cumulative sentiment.
///
/// Missing sentiment (before the first observation) contributes 0.
pub fn sentiment_signal(
    row: &IndicatorRow,
    sentiment: Option<&SentimentPoint>,
    params: &SignalParams,
) -> f64 {
    let ma_term = match (row.sma_fast, row.sma_slow) {
        (Some(fast), Some(slow)) => {
            if fast > slow {
                1.0
            } else {
                -1.0
            }
        }
        _ => return 0.0,
    };
    let (current, trend) = sentiment
        .map(|s| (s.polarity, s.cumulative_average))
        .unwrap_or((0.0, 0.0));

    clamp_signal(
        params.ma_weight * ma_term + params.sentiment_weight * current + params.trend_weight * trend,
    )
}

fn ma_crossover(fast: f64, slow: f64) -> f64 {
    let base = if fast > slow { 0.5 } else { -0.5 };
    let trend_strength = if slow != 0.0 {
        (fast - slow).abs() / slow.abs()
    } else {
        0.0
    };
    base * (1.0 + trend_strength)
}

fn clamp_signal(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
