//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9. All three EMAs use the
//! adjusted span form, so every bar is valid.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    prices: &[PricePoint],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);

    let values = prices
        .iter()
        .zip(macd_line.iter().zip(&signal_line))
        .map(|(p, (&line, &signal))| IndicatorPoint {
            date: p.date,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(prices: &[PricePoint]) -> IndicatorSeries {
    calculate_macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// (line, signal) at `index` if the point exists and is valid.
pub fn macd_at(series: &IndicatorSeries, index: usize) -> Option<(f64, f64)> {
    match series.values.get(index) {
        Some(IndicatorPoint {
            valid: true,
            value: IndicatorValue::Macd { line, signal, .. },
            ..
        }) => Some((*line, *signal)),
        _ => None,
    }
}
