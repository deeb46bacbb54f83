//! Executed trade record.

use chrono::NaiveDate;
use std::fmt;

/// One executed buy. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    symbol: String,
    price: f64,
    quantity: i64,
    date: NaiveDate,
}

impl Position {
    pub fn new(symbol: impl Into<String>, price: f64, quantity: i64, date: NaiveDate) -> Self {
        Position {
            symbol: symbol.into(),
            price,
            quantity,
            date,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// price * quantity
    pub fn cost(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ price {:.2}",
            self.symbol, self.quantity, self.price
        )
    }
}
