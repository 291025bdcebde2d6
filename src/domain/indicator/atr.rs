//! Average True Range indicator.
//!
//! TR[0] = high - low; TR[i] = max(high - low, |high - C[i-1]|, |low - C[i-1]|).
//! ATR[i] = mean(TR[i-n+1..=i]). Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    let tr_values: Vec<f64> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let prev_close = if i == 0 { None } else { Some(prices[i - 1].close) };
            p.true_range(prev_close)
        })
        .collect();

    let values = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i + 1 < period {
                IndicatorPoint::invalid(p.date)
            } else {
                let sum: f64 = tr_values[i + 1 - period..=i].iter().sum();
                IndicatorPoint::simple(p.date, sum / period as f64)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn make_point(day: u32, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn atr_warmup() {
        let prices: Vec<PricePoint> = (1..=5).map(|d| make_point(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&prices, 3);
        assert_eq!(series.values.len(), 5);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn atr_is_rolling_mean_of_true_range() {
        let prices = vec![
            make_point(1, 110.0, 100.0, 105.0),
            make_point(2, 115.0, 105.0, 110.0),
            make_point(3, 120.0, 110.0, 115.0),
            // gap up: |140 - 115| = 25 dominates high-low = 10
            make_point(4, 140.0, 130.0, 135.0),
        ];
        let series = calculate_atr(&prices, 3);
        assert_abs_diff_eq!(series.simple_at(2).unwrap(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(series.simple_at(3).unwrap(), (10.0 + 10.0 + 25.0) / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn atr_first_bar_uses_high_low() {
        let prices = vec![make_point(1, 110.0, 100.0, 105.0)];
        let series = calculate_atr(&prices, 1);
        assert_eq!(series.simple_at(0), Some(10.0));
    }

    #[test]
    fn atr_insufficient_prices() {
        let prices: Vec<PricePoint> = (1..=2).map(|d| make_point(d, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&prices, 5);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn atr_indicator_type() {
        let series = calculate_atr(&[], 14);
        assert_eq!(series.indicator_type, IndicatorType::Atr(14));
    }
}
