//! RSI (Relative Strength Index) indicator.
//!
//! Average gain and average loss are simple means over the last n price
//! changes (losses as positive magnitudes):
//!
//!   RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! Degenerate windows:
//! - avg_loss == 0 and avg_gain > 0: RSI = 100
//! - avg_loss == 0 and avg_gain == 0 (flat window): RSI = 50
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 || prices.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    // changes[j] is the move into bar j + 1
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1].close - w[0].close).collect();

    let values = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i < period {
                return IndicatorPoint::invalid(p.date);
            }
            let window = &changes[i - period..i];
            let gain: f64 = window.iter().filter(|c| **c > 0.0).sum();
            let loss: f64 = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum();
            let avg_gain = gain / period as f64;
            let avg_loss = loss / period as f64;
            IndicatorPoint::simple(p.date, rsi_from_averages(avg_gain, avg_loss))
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
