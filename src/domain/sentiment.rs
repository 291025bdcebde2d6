//! News-sentiment timeline and its join onto price sessions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::ohlcv::PricePoint;

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentPoint {
    pub timestamp: NaiveDateTime,
    /// Polarity of this observation, in [-1, 1].
    pub polarity: f64,
    /// Running mean of polarity up to and including this observation.
    pub cumulative_average: f64,
}

impl SentimentPoint {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Build a timeline from raw (timestamp, polarity) observations.
///
/// Observations are sorted chronologically (stable for equal timestamps),
/// polarity is clamped to [-1, 1] and the running mean is attached.
pub fn with_cumulative_average(mut observations: Vec<(NaiveDateTime, f64)>) -> Vec<SentimentPoint> {
    observations.sort_by_key(|(ts, _)| *ts);

    let mut total = 0.0;
    observations
        .into_iter()
        .enumerate()
        .map(|(i, (timestamp, polarity))| {
            let polarity = polarity.clamp(-1.0, 1.0);
            total += polarity;
            SentimentPoint {
                timestamp,
                polarity,
                cumulative_average: total / (i + 1) as f64,
            }
        })
        .collect()
}

/// Last observation carried forward onto each price session.
///
/// A session is stamped at midnight of its date. Its entry is the latest
/// observation at or before that instant, or `None` before the first
/// observation. News stamped later the same day first applies to the next
/// session. `sentiment` must be chronological.
pub fn forward_fill(prices: &[PricePoint], sentiment: &[SentimentPoint]) -> Vec<Option<SentimentPoint>> {
    let mut next = 0;
    let mut current: Option<&SentimentPoint> = None;

    prices
        .iter()
        .map(|p| {
            let session = p.date.and_time(NaiveTime::MIN);
            while next < sentiment.len() && sentiment[next].timestamp <= session {
                current = Some(&sentiment[next]);
                next += 1;
            }
            current.cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn price(date: &str) -> PricePoint {
        PricePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: 10.0,
            high: 10.0,
            low: 10.0,
            close: 10.0,
            volume: 100,
        }
    }

    #[test]
    fn cumulative_average_is_running_mean() {
        let timeline = with_cumulative_average(vec![
            (ts("2024-01-02", "09:00:00"), 0.5),
            (ts("2024-01-01", "09:00:00"), 1.0),
            (ts("2024-01-03", "09:00:00"), -0.3),
        ]);
        let polarities: Vec<f64> = timeline.iter().map(|s| s.polarity).collect();
        assert_eq!(polarities, vec![1.0, 0.5, -0.3]);
        assert!((timeline[0].cumulative_average - 1.0).abs() < 1e-12);
        assert!((timeline[1].cumulative_average - 0.75).abs() < 1e-12);
        assert!((timeline[2].cumulative_average - 0.4).abs() < 1e-12);
    }

    #[test]
    fn polarity_is_clamped() {
        let timeline = with_cumulative_average(vec![(ts("2024-01-01", "00:00:00"), 3.0)]);
        assert_eq!(timeline[0].polarity, 1.0);
    }

    #[test]
    fn forward_fill_undefined_before_first_observation() {
        let prices = vec![price("2024-01-01"), price("2024-01-02"), price("2024-01-03")];
        let sentiment = with_cumulative_average(vec![(ts("2024-01-02", "00:00:00"), 0.4)]);
        let joined = forward_fill(&prices, &sentiment);
        assert!(joined[0].is_none());
        assert_eq!(joined[1].as_ref().map(|s| s.polarity), Some(0.4));
        assert_eq!(joined[2].as_ref().map(|s| s.polarity), Some(0.4));
    }

    #[test]
    fn forward_fill_takes_latest_at_or_before_session_start() {
        let prices = vec![price("2024-01-02"), price("2024-01-05")];
        let sentiment = with_cumulative_average(vec![
            (ts("2024-01-01", "10:00:00"), 0.1),
            (ts("2024-01-02", "00:00:00"), 0.2),
            (ts("2024-01-02", "18:00:00"), 0.3),
            (ts("2024-01-04", "10:00:00"), -0.5),
        ]);
        let joined = forward_fill(&prices, &sentiment);
        assert_eq!(joined[0].as_ref().map(|s| s.polarity), Some(0.2));
        assert_eq!(joined[1].as_ref().map(|s| s.polarity), Some(-0.5));
    }

    #[test]
    fn same_day_news_after_session_start_waits_for_next_session() {
        let prices = vec![price("2024-01-02"), price("2024-01-03")];
        let sentiment = with_cumulative_average(vec![(ts("2024-01-02", "23:59:00"), -0.7)]);
        let joined = forward_fill(&prices, &sentiment);
        assert!(joined[0].is_none());
        assert_eq!(joined[1].as_ref().map(|s| s.timestamp), Some(ts("2024-01-02", "23:59:00")));
    }

    #[test]
    fn forward_fill_empty_timeline() {
        let prices = vec![price("2024-01-01")];
        assert_eq!(forward_fill(&prices, &[]), vec![None]);
    }
}
