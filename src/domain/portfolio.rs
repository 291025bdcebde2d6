//! Portfolio ledger: cash, positions and the trade log.
//!
//! A `Ledger` is a plain value owned by whoever drives it. Each simulation
//! creates its own; nothing is shared between runs.

use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

use super::error::StockPulseError;
use super::position::{Trade, TradeSide};

/// Outcome of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Filled { shares: f64, price: f64, cost: f64 },
    /// Cost exceeds available cash. Nothing changed.
    InsufficientFunds,
    /// Non-positive or non-finite shares or price. Nothing changed.
    InvalidOrder,
}

impl EntryResult {
    pub fn is_filled(&self) -> bool {
        matches!(self, EntryResult::Filled { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    cash: f64,
    initial_capital: f64,
    positions: BTreeMap<String, f64>,
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new(initial_capital: f64) -> Self {
        Ledger {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
            trades: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn position(&self, symbol: &str) -> Option<f64> {
        self.positions.get(symbol).copied()
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn positions(&self) -> &BTreeMap<String, f64> {
        &self.positions
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// Buy `shares` at `price`. All-or-nothing: an unaffordable order is
    /// skipped, never partially filled.
    pub fn buy(&mut self, symbol: &str, shares: f64, price: f64, date: NaiveDate) -> EntryResult {
        if !is_positive(shares) || !is_positive(price) {
            debug!("{date}: rejected buy of {shares} {symbol} @ {price}");
            return EntryResult::InvalidOrder;
        }

        let cost = shares * price;
        if cost > self.cash {
            debug!(
                "{date}: skipped buy of {shares:.4} {symbol} @ {price:.2}: cost {cost:.2} exceeds cash {:.2}",
                self.cash
            );
            return EntryResult::InsufficientFunds;
        }

        self.cash -= cost;
        *self.positions.entry(symbol.to_string()).or_insert(0.0) += shares;
        self.trades.push(Trade::new(date, symbol, TradeSide::Buy, shares, price));

        EntryResult::Filled {
            shares,
            price,
            cost,
        }
    }

    /// Sell the full held quantity of `symbol` and remove it from the book.
    ///
    /// `shares` must equal the held quantity; selling a symbol that is not
    /// held is a contract violation.
    pub fn sell(
        &mut self,
        symbol: &str,
        shares: f64,
        price: f64,
        date: NaiveDate,
    ) -> Result<Trade, StockPulseError> {
        let held = self
            .positions
            .get(symbol)
            .copied()
            .ok_or_else(|| StockPulseError::PositionNotHeld {
                symbol: symbol.to_string(),
            })?;

        if shares != held {
            return Err(StockPulseError::SellQuantityMismatch {
                symbol: symbol.to_string(),
                requested: shares,
                held,
            });
        }
        if !is_positive(price) {
            return Err(StockPulseError::Data {
                reason: format!("invalid sell price {price} for {symbol} on {date}"),
            });
        }

        let trade = Trade::new(date, symbol, TradeSide::Sell, shares, price);
        self.cash += trade.value;
        self.positions.remove(symbol);
        self.trades.push(trade.clone());
        Ok(trade)
    }

    /// Full exit of whatever is held in `symbol`.
    pub fn close_position(
        &mut self,
        symbol: &str,
        price: f64,
        date: NaiveDate,
    ) -> Result<Trade, StockPulseError> {
        let held = self
            .position(symbol)
            .ok_or_else(|| StockPulseError::PositionNotHeld {
                symbol: symbol.to_string(),
            })?;
        self.sell(symbol, held, price, date)
    }

    /// cash + Σ(shares × current price) over held symbols.
    pub fn mark_to_market<F>(&self, price_of: F) -> Result<f64, StockPulseError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut value = self.cash;
        for (symbol, shares) in &self.positions {
            let price = price_of(symbol).ok_or_else(|| StockPulseError::MissingPrice {
                symbol: symbol.clone(),
            })?;
            value += shares * price;
        }
        Ok(value)
    }

    /// Rebuild a ledger by re-executing a trade log from `initial_capital`.
    pub fn replay(initial_capital: f64, trades: &[Trade]) -> Result<Ledger, StockPulseError> {
        let mut ledger = Ledger::new(initial_capital);
        for trade in trades {
            match trade.side {
                TradeSide::Buy => {
                    let outcome = ledger.buy(&trade.symbol, trade.shares, trade.price, trade.date);
                    if !outcome.is_filled() {
                        return Err(StockPulseError::Data {
                            reason: format!(
                                "buy of {} {} on {} cannot be replayed: {:?}",
                                trade.shares, trade.symbol, trade.date, outcome
                            ),
                        });
                    }
                }
                TradeSide::Sell => {
                    ledger.sell(&trade.symbol, trade.shares, trade.price, trade.date)?;
                }
            }
        }
        Ok(ledger)
    }
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}
