#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::cell::Cell;
use std::collections::HashMap;
use stockpulse::domain::error::StockPulseError;
pub use stockpulse::domain::ohlcv::PricePoint;
use stockpulse::domain::sentiment::{with_cumulative_average, SentimentPoint};
use stockpulse::ports::price_port::{PriceSource, SentimentSource};

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockPulseError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockPulseError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|prices| {
                prices
                    .iter()
                    .filter(|p| start.is_none_or(|s| p.date >= s) && end.is_none_or(|e| p.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct MockSentimentSource {
    pub data: HashMap<String, Vec<SentimentPoint>>,
}

impl MockSentimentSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_sentiment(mut self, symbol: &str, points: Vec<SentimentPoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }
}

impl SentimentSource for MockSentimentSource {
    fn fetch_sentiment(
        &self,
        symbol: &str,
        _start: Option<NaiveDate>,
        _end: Option<NaiveDate>,
    ) -> Result<Vec<SentimentPoint>, StockPulseError> {
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start_date() -> NaiveDate {
    date(2024, 1, 1)
}

/// One session per calendar day from 2024-01-01, high/low one unit around close.
pub fn make_series(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start_date() + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10_000,
        })
        .collect()
}

pub fn flat_closes(len: usize, price: f64) -> Vec<f64> {
    vec![price; len]
}

pub fn rising_closes(len: usize, start: f64, step: f64) -> Vec<f64> {
    (0..len).map(|i| start + step * i as f64).collect()
}

/// Flat at 100, a two-day dip (90, 95), then flat at 100 again.
///
/// With RSI(14) the dip drives RSI to 0 on the 90 bar; once the loss leaves
/// the window while the recovery gains remain, RSI reaches 100.
pub fn rsi_dip_then_rally_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 21];
    closes.push(90.0);
    closes.push(95.0);
    closes.extend(std::iter::repeat_n(100.0, 17));
    closes
}

/// One observation per price date, at midnight.
pub fn sentiment_for(prices: &[PricePoint], polarity: impl Fn(usize) -> f64) -> Vec<SentimentPoint> {
    with_cumulative_average(
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (NaiveDateTime::new(p.date, NaiveTime::MIN), polarity(i)))
            .collect(),
    )
}
