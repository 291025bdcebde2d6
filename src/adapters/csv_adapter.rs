//! CSV file adapter for price history and news sentiment.
//!
//! Prices live in `<prices_dir>/<SYMBOL>.csv` with the columns
//! `date,open,high,low,close,volume`. Sentiment lives in
//! `<sentiment_dir>/<SYMBOL>_sentiment.csv` with `timestamp,polarity`.

use crate::domain::error::StockPulseError;
use crate::domain::ohlcv::PricePoint;
use crate::domain::sentiment::{with_cumulative_average, SentimentPoint};
use crate::ports::price_port::{PriceSource, SentimentSource};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct CsvAdapter {
    prices_dir: PathBuf,
    sentiment_dir: PathBuf,
}

impl CsvAdapter {
    /// Prices and sentiment both read from `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            sentiment_dir: base_path.clone(),
            prices_dir: base_path,
        }
    }

    pub fn with_sentiment_dir(mut self, sentiment_dir: PathBuf) -> Self {
        self.sentiment_dir = sentiment_dir;
        self
    }

    fn price_path(&self, symbol: &str) -> PathBuf {
        self.prices_dir.join(format!("{symbol}.csv"))
    }

    fn sentiment_path(&self, symbol: &str) -> PathBuf {
        self.sentiment_dir.join(format!("{symbol}_sentiment.csv"))
    }
}

fn read_records(path: &Path) -> Result<Vec<csv::StringRecord>, StockPulseError> {
    let content = fs::read_to_string(path).map_err(|e| StockPulseError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes())
        .records()
        .map(|r| {
            r.map_err(|e| StockPulseError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })
        })
        .collect()
}

fn field<T>(record: &csv::StringRecord, idx: usize, name: &str) -> Result<T, StockPulseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let line = record.position().map_or(0, |p| p.line());
    record
        .get(idx)
        .ok_or_else(|| StockPulseError::Data {
            reason: format!("line {line}: missing {name} column"),
        })?
        .parse()
        .map_err(|e| StockPulseError::Data {
            reason: format!("line {line}: invalid {name} value: {e}"),
        })
}

/// Whole-number volume; exports that write `50000.0` are accepted.
fn volume(record: &csv::StringRecord) -> Result<i64, StockPulseError> {
    let raw: f64 = field(record, 5, "volume")?;
    if !(raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0) {
        let line = record.position().map_or(0, |p| p.line());
        return Err(StockPulseError::Data {
            reason: format!("line {line}: volume must be a non-negative whole number, got {raw}"),
        });
    }
    Ok(raw as i64)
}

fn in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
}

/// `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` read as midnight.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

impl PriceSource for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockPulseError> {
        let path = self.price_path(symbol);
        if !path.exists() {
            debug!("{symbol}: no price file at {}", path.display());
            return Ok(Vec::new());
        }

        let mut prices = Vec::new();

        for record in read_records(&path)? {
            let date_str: String = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                StockPulseError::Data {
                    reason: format!("invalid date '{date_str}' in {}: {e}", path.display()),
                }
            })?;

            if !in_range(date, start, end) {
                continue;
            }

            let point = PricePoint {
                date,
                open: field(&record, 1, "open")?,
                high: field(&record, 2, "high")?,
                low: field(&record, 3, "low")?,
                close: field(&record, 4, "close")?,
                volume: volume(&record)?,
            };
            if !(point.close.is_finite() && point.close > 0.0) {
                return Err(StockPulseError::Data {
                    reason: format!("{symbol} {date}: close must be positive, got {}", point.close),
                });
            }
            prices.push(point);
        }

        if !prices.windows(2).all(|w| w[0].date <= w[1].date) {
            warn!("{}: rows out of order, sorting by date", path.display());
        }
        prices.sort_by_key(|p| p.date);

        let before = prices.len();
        prices.dedup_by_key(|p| p.date);
        if prices.len() < before {
            warn!(
                "{}: dropped {} duplicate date rows (first kept)",
                path.display(),
                before - prices.len()
            );
        }

        debug!("{symbol}: loaded {} sessions from {}", prices.len(), path.display());
        Ok(prices)
    }
}

impl SentimentSource for CsvAdapter {
    fn fetch_sentiment(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SentimentPoint>, StockPulseError> {
        let path = self.sentiment_path(symbol);
        if !path.exists() {
            debug!("{symbol}: no sentiment file at {}", path.display());
            return Ok(Vec::new());
        }

        let mut observations = Vec::new();
        for record in read_records(&path)? {
            let raw: String = field(&record, 0, "timestamp")?;
            let timestamp = parse_timestamp(&raw).ok_or_else(|| StockPulseError::Data {
                reason: format!("invalid timestamp '{raw}' in {}", path.display()),
            })?;
            let polarity: f64 = field(&record, 1, "polarity")?;
            if !polarity.is_finite() {
                return Err(StockPulseError::Data {
                    reason: format!("non-finite polarity at {raw} in {}", path.display()),
                });
            }
            if in_range(timestamp.date(), start, end) {
                observations.push((timestamp, polarity));
            }
        }

        Ok(with_cumulative_average(observations))
    }
}
