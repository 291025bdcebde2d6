//! Market data ports: price history and news sentiment.

use crate::domain::error::StockPulseError;
use crate::domain::ohlcv::PricePoint;
use crate::domain::sentiment::SentimentPoint;
use chrono::NaiveDate;

pub trait PriceSource {
    /// Chronological sessions for `symbol` within `[start, end]` (either bound
    /// optional). An empty vector means no data for the symbol or range.
    fn fetch_prices(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StockPulseError>;
}

pub trait SentimentSource {
    /// Chronological observations with their running average attached. An
    /// empty vector means no news.
    fn fetch_sentiment(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<SentimentPoint>, StockPulseError>;
}
