//! Core domain types and logic: indicators, signals, the ledger, the
//! simulation driver and its metrics.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod sentiment;
pub mod strategy;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
