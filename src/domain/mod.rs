//! Core domain types and logic.

pub mod position;
pub mod holdings;
pub mod price_series;
pub mod income;
pub mod decision;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod config_validation;
pub mod error;
