//! Domain error types.

/// Top-level error type for stockpulse.
#[derive(Debug, thiserror::Error)]
pub enum StockPulseError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("unknown strategy '{name}' (expected ma_crossover, rsi or macd)")]
    UnknownStrategy { name: String },

    #[error("cannot sell {symbol}: no position held")]
    PositionNotHeld { symbol: String },

    #[error("cannot sell {requested} shares of {symbol}: position holds {held}")]
    SellQuantityMismatch {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("no price available to value open position in {symbol}")]
    MissingPrice { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockPulseError> for std::process::ExitCode {
    fn from(err: &StockPulseError) -> Self {
        let code: u8 = match err {
            StockPulseError::Io(_) => 1,
            StockPulseError::ConfigParse { .. }
            | StockPulseError::ConfigMissing { .. }
            | StockPulseError::ConfigInvalid { .. } => 2,
            StockPulseError::Data { .. } => 3,
            StockPulseError::UnknownStrategy { .. } => 4,
            StockPulseError::NoData { .. } => 5,
            StockPulseError::PositionNotHeld { .. }
            | StockPulseError::SellQuantityMismatch { .. }
            | StockPulseError::MissingPrice { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
