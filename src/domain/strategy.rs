//! Strategy selection and signal parameters.

use std::fmt;
use std::str::FromStr;

use super::error::StockPulseError;
use super::sentiment::SentimentPoint;

/// Price-only trading rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MaCrossover,
    Rsi,
    Macd,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [StrategyKind::MaCrossover, StrategyKind::Rsi, StrategyKind::Macd];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MaCrossover => "ma_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StockPulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ma_crossover" => Ok(StrategyKind::MaCrossover),
            "rsi" => Ok(StrategyKind::Rsi),
            "macd" => Ok(StrategyKind::Macd),
            _ => Err(StockPulseError::UnknownStrategy { name: s.to_string() }),
        }
    }
}

/// How signals are produced for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMode {
    /// One of the price-only rules, with risk-based position sizing.
    Technical(StrategyKind),
    /// MA trend blended with a chronological news-sentiment timeline, with
    /// fixed-fraction position sizing.
    Sentiment(Vec<SentimentPoint>),
}

impl SignalMode {
    pub fn label(&self) -> String {
        match self {
            SignalMode::Technical(kind) => kind.to_string(),
            SignalMode::Sentiment(_) => "sentiment".to_string(),
        }
    }

    pub fn is_sentiment(&self) -> bool {
        matches!(self, SignalMode::Sentiment(_))
    }
}

/// Thresholds and blend weights for signal generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub ma_weight: f64,
    pub sentiment_weight: f64,
    pub trend_weight: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            ma_weight: 0.3,
            sentiment_weight: 0.3,
            trend_weight: 0.4,
        }
    }
}
