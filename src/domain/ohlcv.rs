//! OHLCV price point representation.

use chrono::NaiveDate;

/// One trading session. Series are ordered by strictly increasing `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PricePoint {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    ///
    /// Without a prior close (first session) the range is just high - low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.high - self.low;
        match prev_close {
            Some(pc) => {
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => hl,
        }
    }
}

/// True if every date is strictly after the one before it.
pub fn is_chronological(prices: &[PricePoint]) -> bool {
    prices.windows(2).all(|w| w[0].date < w[1].date)
}
