//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_sma(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    let values = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i + 1 < period {
                IndicatorPoint::invalid(p.date)
            } else {
                // Per-window sum: a constant series yields the same SMA for any window.
                let sum: f64 = prices[i + 1 - period..=i].iter().map(|q| q.close).sum();
                IndicatorPoint::simple(p.date, sum / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
