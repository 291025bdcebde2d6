//! Exponential Moving Average indicator (span form, adjusted weights).
//!
//! α = 2/(span+1). The value at i is the weighted mean of all observations so
//! far with weight (1-α)^k on the observation k steps back:
//!
//!   num[i] = C[i] + (1-α)·num[i-1]
//!   den[i] = 1    + (1-α)·den[i-1]
//!   EMA[i] = num[i] / den[i]
//!
//! Defined from the first bar; there is no warm-up window.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_ema(prices: &[PricePoint], span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let values = prices
        .iter()
        .zip(ema_values(&closes, span))
        .map(|(p, v)| IndicatorPoint::simple(p.date, v))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

/// Adjusted span EMA over a raw value slice. `span` must be non-zero.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut num = 0.0;
    let mut den = 0.0;

    values
        .iter()
        .map(|&x| {
            num = x + decay * num;
            den = 1.0 + decay * den;
            num / den
        })
        .collect()
}
