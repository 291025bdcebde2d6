//! Configuration validation.
//!
//! Checks every `[simulation]`, `[indicators]` and `[signal]` value before a
//! run. Absent keys fall back to their defaults; present keys must parse.

use crate::domain::error::StockPulseError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockPulseError> {
    validate_simulation(config)?;
    validate_indicators(config)?;
    validate_signal(config)?;
    Ok(())
}

fn validate_simulation(config: &dyn ConfigPort) -> Result<(), StockPulseError> {
    let capital = read_f64(config, "simulation", "initial_capital", 10_000.0)?;
    if !(capital.is_finite() && capital > 0.0) {
        return Err(invalid("simulation", "initial_capital", "must be positive"));
    }

    for (key, default) in [
        ("risk_per_trade", 0.02),
        ("max_cash_fraction", 0.95),
        ("sentiment_allocation", 0.30),
    ] {
        let value = read_f64(config, "simulation", key, default)?;
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid("simulation", key, "must be in (0, 1]"));
        }
    }

    if let Some(raw) = config.get_string("simulation", "fractional_shares") {
        if !matches!(
            raw.to_lowercase().as_str(),
            "true" | "yes" | "on" | "1" | "false" | "no" | "off" | "0"
        ) {
            return Err(invalid("simulation", "fractional_shares", "expected true or false"));
        }
    }

    if let Some(name) = config.get_string("simulation", "strategy") {
        name.parse::<StrategyKind>()?;
    }

    let start = parse_date(config, "simulation", "start_date")?;
    let end = parse_date(config, "simulation", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("simulation", "start_date", "start_date must be before end_date"));
        }
    }
    Ok(())
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), StockPulseError> {
    let mut periods = Vec::new();
    for (key, default) in [
        ("sma_fast", 20),
        ("sma_slow", 50),
        ("ema_fast", 12),
        ("ema_slow", 26),
        ("signal", 9),
        ("rsi", 14),
        ("atr", 14),
    ] {
        let value = read_i64(config, "indicators", key, default)?;
        if value < 1 {
            return Err(invalid("indicators", key, "period must be at least 1"));
        }
        periods.push(value);
    }

    if periods[0] >= periods[1] {
        return Err(invalid("indicators", "sma_fast", "sma_fast must be less than sma_slow"));
    }
    if periods[2] >= periods[3] {
        return Err(invalid("indicators", "ema_fast", "ema_fast must be less than ema_slow"));
    }
    Ok(())
}

fn validate_signal(config: &dyn ConfigPort) -> Result<(), StockPulseError> {
    let oversold = read_f64(config, "signal", "rsi_oversold", 30.0)?;
    let overbought = read_f64(config, "signal", "rsi_overbought", 70.0)?;
    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid("signal", "rsi_oversold", "must be in [0, 100]"));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid("signal", "rsi_overbought", "must be in [0, 100]"));
    }
    if oversold >= overbought {
        return Err(invalid(
            "signal",
            "rsi_oversold",
            "rsi_oversold must be less than rsi_overbought",
        ));
    }

    for (key, default) in [
        ("ma_weight", 0.3),
        ("sentiment_weight", 0.3),
        ("trend_weight", 0.4),
    ] {
        let value = read_f64(config, "signal", key, default)?;
        if !(value.is_finite() && value >= 0.0) {
            return Err(invalid("signal", key, "weight must be non-negative"));
        }
    }
    Ok(())
}

/// An optional `YYYY-MM-DD` date; present but malformed is an error.
pub fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StockPulseError> {
    config
        .get_string(section, key)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|_| invalid(section, key, "invalid date format, expected YYYY-MM-DD"))
        })
        .transpose()
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StockPulseError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| invalid(section, key, &format!("'{s}' is not a number"))),
    }
}

fn read_i64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, StockPulseError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| invalid(section, key, &format!("'{s}' is not an integer"))),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> StockPulseError {
    StockPulseError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
