//! Configuration validation.
//!
//! Validates all config fields before a simulation runs.

use chrono::NaiveDate;
use std::str::FromStr;

use super::decision::DrawdownParams;
use super::error::DcatraderError;
use super::strategy::StrategyKind;
use super::universe::parse_codes;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    validate_prices_path(config)?;
    validate_date_range(config)?;
    validate_symbol(config)?;
    validate_strategy(config)?;
    validate_initial_cash(config)?;
    validate_income(config)?;
    validate_seed(config)?;
    validate_drawdown(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> DcatraderError {
    DcatraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Read a numeric key, rejecting values that are present but unparseable.
fn parse_number<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, DcatraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| invalid(section, key, &format!("'{raw}' is not a number"))),
    }
}

fn validate_prices_path(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    match config.get_string("data", "prices") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(DcatraderError::ConfigMissing {
            section: "data".to_string(),
            key: "prices".to_string(),
        }),
    }
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, DcatraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    section,
                    key,
                    &format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

fn validate_date_range(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    let start = parse_optional_date(config, "data", "start_date")?;
    let end = parse_optional_date(config, "data", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "data",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

/// A run needs either `[simulation] symbol` (one or a comma list) or a
/// `[data] tickers` file.
fn validate_symbol(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    match config.get_string("simulation", "symbol") {
        Some(s) => {
            parse_codes(&s).map_err(|e| invalid("simulation", "symbol", &e.to_string()))?;
            Ok(())
        }
        None if config.get_string("data", "tickers").is_some() => Ok(()),
        None => Err(DcatraderError::ConfigMissing {
            section: "simulation".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    if let Some(s) = config.get_string("simulation", "strategy") {
        s.parse::<StrategyKind>()
            .map_err(|reason| invalid("simulation", "strategy", &reason))?;
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    let value = parse_number(config, "simulation", "initial_cash", DEFAULT_INITIAL_CASH)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "simulation",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_income(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    let value: f64 = parse_number(config, "simulation", "income", 0.0)?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "simulation",
            "income",
            "income must be non-negative",
        ));
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    if let Some(s) = config.get_string("simulation", "seed") {
        s.trim()
            .parse::<u64>()
            .map_err(|_| invalid("simulation", "seed", "seed must be an unsigned integer"))?;
    }
    Ok(())
}

fn validate_drawdown(config: &dyn ConfigPort) -> Result<(), DcatraderError> {
    let defaults = DrawdownParams::default();
    let lot = parse_number(config, "drawdown", "opening_lot", defaults.opening_lot)?;
    if lot < 0 {
        return Err(invalid(
            "drawdown",
            "opening_lot",
            "opening_lot must be non-negative",
        ));
    }
    let p = parse_number(config, "drawdown", "buy_probability", defaults.buy_probability)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(
            "drawdown",
            "buy_probability",
            "buy_probability must be between 0 and 1",
        ));
    }
    Ok(())
}
