//! Trade execution against a cash balance.
//!
//! Implements whole-share quantity sizing and the shared buy routine every
//! strategy kind goes through.

use chrono::NaiveDate;

use super::error::DcatraderError;
use super::holdings::Holdings;
use super::position::Position;

/// Whole shares `cash` can buy at `price`: floor(cash / price).
///
/// Float division can round up to the next integer when `cash` is a hair
/// short of a multiple of `price`; the result is stepped down so that
/// `price * quantity <= cash` always holds.
pub fn affordable_quantity(cash: f64, price: f64) -> i64 {
    if cash <= 0.0 || price <= 0.0 || !cash.is_finite() || !price.is_finite() {
        return 0;
    }
    let mut quantity = (cash / price).floor() as i64;
    while quantity > 0 && price * quantity as f64 > cash {
        quantity -= 1;
    }
    quantity
}

/// Buy `quantity` shares of `symbol` at `price`, returning the new cash
/// balance.
///
/// Steps:
/// 1. Reject negative quantities and non-positive prices
/// 2. remainder = cash - price * quantity
/// 3. Reject the order if remainder would be negative
/// 4. If quantity > 0, append a position to holdings
pub fn execute_buy(
    holdings: &mut Holdings,
    cash: f64,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    quantity: i64,
) -> Result<f64, DcatraderError> {
    if quantity < 0 {
        return Err(DcatraderError::InvalidQuantity { quantity });
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(DcatraderError::InvalidPrice { date, price });
    }
    if quantity == 0 {
        return Ok(cash);
    }

    let cost = price * quantity as f64;
    let remainder = cash - cost;
    if remainder < 0.0 {
        return Err(DcatraderError::InsufficientCash { cash, cost });
    }

    holdings.add(Position::new(symbol, price, quantity, date));
    log::debug!("{date}: bought {quantity} {symbol} @ {price:.2}, cash left {remainder:.2}");

    Ok(remainder)
}
