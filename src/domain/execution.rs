//! Position sizing policy applied by the simulation driver.
//!
//! Price-only runs size buys by risk: (cash × risk_per_trade) / ATR, capped so
//! the cost stays within `max_cash_fraction` of cash. Sentiment runs spend a
//! fixed fraction of cash per buy.

/// ATR substitute, as a fraction of close, when ATR is undefined.
pub const ATR_FALLBACK_PCT: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    pub risk_per_trade: f64,
    pub max_cash_fraction: f64,
    pub sentiment_allocation: f64,
    /// When false, share counts are floored to whole shares.
    pub fractional_shares: bool,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            risk_per_trade: 0.02,
            max_cash_fraction: 0.95,
            sentiment_allocation: 0.30,
            fractional_shares: true,
        }
    }
}

/// Risk-based share count for a buy at `close`.
pub fn risk_based_shares(cash: f64, close: f64, atr: Option<f64>, params: &RiskParams) -> f64 {
    if !tradable(cash, close) {
        return 0.0;
    }
    let atr = atr
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(close * ATR_FALLBACK_PCT);
    let risk_shares = cash * params.risk_per_trade / atr;
    let cap_shares = cash * params.max_cash_fraction / close;
    fit_to_cash(risk_shares.min(cap_shares), cash, close, params)
}

/// Fixed-fraction share count for a buy at `close`.
pub fn fixed_fraction_shares(cash: f64, close: f64, params: &RiskParams) -> f64 {
    if !tradable(cash, close) {
        return 0.0;
    }
    fit_to_cash(cash * params.sentiment_allocation / close, cash, close, params)
}

/// Round per the share policy, then step down until `shares * close <= cash`.
/// A cash fraction of 1 can otherwise overshoot cash by a rounding ulp.
fn fit_to_cash(shares: f64, cash: f64, close: f64, params: &RiskParams) -> f64 {
    let mut shares = if params.fractional_shares {
        shares
    } else {
        shares.floor()
    };
    while shares > 0.0 && shares * close > cash {
        shares = if params.fractional_shares {
            shares - shares * f64::EPSILON
        } else {
            shares - 1.0
        };
    }
    shares.max(0.0)
}

fn tradable(cash: f64, close: f64) -> bool {
    cash > 0.0 && close.is_finite() && close > 0.0
}
