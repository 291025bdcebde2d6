//! Assembly of per-indicator series into enriched rows.

use crate::domain::indicator::macd::macd_at;
use crate::domain::indicator::{
    calculate_atr, calculate_ema, calculate_macd, calculate_rsi, calculate_sma, IndicatorType,
};
use crate::domain::ohlcv::PricePoint;
use chrono::NaiveDate;

/// Lookback lengths for the indicator set.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub signal: usize,
    pub rsi: usize,
    pub atr: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            sma_fast: 20,
            sma_slow: 50,
            ema_fast: 12,
            ema_slow: 26,
            signal: 9,
            rsi: 14,
            atr: 14,
        }
    }
}

impl IndicatorConfig {
    /// Number of leading rows on which at least one field is undefined.
    pub fn warmup_len(&self) -> usize {
        [
            self.sma_fast.saturating_sub(1),
            self.sma_slow.saturating_sub(1),
            self.rsi,
            self.atr.saturating_sub(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.sma_fast),
            IndicatorType::Sma(self.sma_slow),
            IndicatorType::Ema(self.ema_fast),
            IndicatorType::Ema(self.ema_slow),
            IndicatorType::Macd {
                fast: self.ema_fast,
                slow: self.ema_slow,
                signal: self.signal,
            },
            IndicatorType::Rsi(self.rsi),
            IndicatorType::Atr(self.atr),
        ]
    }
}

/// A price point plus its derived indicators. `None` marks a value that is
/// undefined at this row (warm-up).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub price: PricePoint,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorRow {
    pub fn date(&self) -> NaiveDate {
        self.price.date
    }

    pub fn close(&self) -> f64 {
        self.price.close
    }

    /// True once every derived field is defined.
    pub fn is_complete(&self) -> bool {
        [
            self.sma_fast,
            self.sma_slow,
            self.ema_fast,
            self.ema_slow,
            self.macd,
            self.signal_line,
            self.rsi,
            self.atr,
        ]
        .iter()
        .all(Option::is_some)
    }
}

/// Compute the full indicator set and zip it onto the price series.
pub fn enrich(prices: &[PricePoint], config: &IndicatorConfig) -> Vec<IndicatorRow> {
    let sma_fast = calculate_sma(prices, config.sma_fast);
    let sma_slow = calculate_sma(prices, config.sma_slow);
    let ema_fast = calculate_ema(prices, config.ema_fast);
    let ema_slow = calculate_ema(prices, config.ema_slow);
    let macd = calculate_macd(prices, config.ema_fast, config.ema_slow, config.signal);
    let rsi = calculate_rsi(prices, config.rsi);
    let atr = calculate_atr(prices, config.atr);

    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (line, signal) = match macd_at(&macd, i) {
                Some((l, s)) => (Some(l), Some(s)),
                None => (None, None),
            };
            IndicatorRow {
                price: p.clone(),
                sma_fast: sma_fast.simple_at(i),
                sma_slow: sma_slow.simple_at(i),
                ema_fast: ema_fast.simple_at(i),
                ema_slow: ema_slow.simple_at(i),
                macd: line,
                signal_line: signal,
                rsi: rsi.simple_at(i),
                atr: atr.simple_at(i),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_prices(count: usize) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i % 9) as f64;
                PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    #[test]
    fn default_warmup_is_slow_sma() {
        assert_eq!(IndicatorConfig::default().warmup_len(), 49);
    }

    #[test]
    fn warmup_respects_longest_lookback() {
        let config = IndicatorConfig {
            sma_fast: 2,
            sma_slow: 3,
            rsi: 10,
            atr: 4,
            ..IndicatorConfig::default()
        };
        assert_eq!(config.warmup_len(), 10);
    }

    #[test]
    fn enrich_preserves_length_and_dates() {
        let prices = make_prices(60);
        let rows = enrich(&prices, &IndicatorConfig::default());
        assert_eq!(rows.len(), 60);
        for (row, p) in rows.iter().zip(&prices) {
            assert_eq!(row.date(), p.date);
            assert_eq!(row.close(), p.close);
        }
    }

    #[test]
    fn enrich_marks_warmup_rows_incomplete() {
        let config = IndicatorConfig::default();
        let rows = enrich(&make_prices(60), &config);
        let warmup = config.warmup_len();
        assert!(rows[..warmup].iter().all(|r| !r.is_complete()));
        assert!(rows[warmup..].iter().all(IndicatorRow::is_complete));
        assert!(rows[warmup - 1].sma_slow.is_none());
        assert!(rows[warmup].sma_slow.is_some());
    }

    #[test]
    fn enrich_ema_fields_defined_from_start() {
        let rows = enrich(&make_prices(3), &IndicatorConfig::default());
        assert!(rows.iter().all(|r| r.ema_fast.is_some() && r.macd.is_some()));
        assert!(rows.iter().all(|r| r.rsi.is_none()));
    }

    #[test]
    fn enrich_empty() {
        assert!(enrich(&[], &IndicatorConfig::default()).is_empty());
    }

    #[test]
    fn indicator_types_listing() {
        let names: Vec<String> = IndicatorConfig::default()
            .indicator_types()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            names,
            vec!["SMA(20)", "SMA(50)", "EMA(12)", "EMA(26)", "MACD(12,26,9)", "RSI(14)", "ATR(14)"]
        );
    }
}
