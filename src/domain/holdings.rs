//! Append-only ledger of executed positions.

use std::collections::BTreeMap;
use std::fmt;

use super::position::Position;

pub const HOLDINGS_COLUMNS: [&str; 4] = ["symbol", "price", "quantity", "date"];

/// Holdings flattened into rows of strings, one row per position.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingsTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Holdings {
    positions: Vec<Position>,
}

impl Holdings {
    pub fn new() -> Self {
        Holdings {
            positions: Vec::new(),
        }
    }

    pub fn add(&mut self, position: Position) {
        self.positions.push(position);
    }

    pub fn extend<I: IntoIterator<Item = Position>>(&mut self, positions: I) {
        self.positions.extend(positions);
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.positions.iter().map(Position::quantity).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.positions.iter().map(Position::cost).sum()
    }

    /// Number of trades recorded per symbol.
    pub fn symbol_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for pos in &self.positions {
            *counts.entry(pos.symbol().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_table(&self) -> HoldingsTable {
        let rows = self
            .positions
            .iter()
            .map(|pos| {
                vec![
                    pos.symbol().to_string(),
                    pos.price().to_string(),
                    pos.quantity().to_string(),
                    pos.date().format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();
        HoldingsTable {
            columns: HOLDINGS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

impl FromIterator<Position> for Holdings {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Holdings {
            positions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Holdings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<String> = self
            .symbol_counts()
            .iter()
            .map(|(symbol, count)| format!("{symbol}: {count}"))
            .collect();
        write!(f, "{{{}}}", body.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pos(symbol: &str, price: f64, quantity: i64, day: u32) -> Position {
        Position::new(
            symbol,
            price,
            quantity,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        )
    }

    #[test]
    fn new_holdings_empty() {
        let holdings = Holdings::new();
        assert!(holdings.is_empty());
        assert_eq!(holdings.len(), 0);
        assert_eq!(holdings.total_quantity(), 0);
    }

    #[test]
    fn add_appends_in_order() {
        let mut holdings = Holdings::new();
        holdings.add(pos("VOO", 100.0, 2, 2));
        holdings.add(pos("VOO", 101.0, 1, 3));

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings.positions()[0].quantity(), 2);
        assert_eq!(holdings.positions()[1].quantity(), 1);
    }

    #[test]
    fn extend_appends_many() {
        let mut holdings = Holdings::new();
        holdings.add(pos("VOO", 100.0, 2, 2));
        holdings.extend(vec![pos("QQQ", 300.0, 1, 3), pos("VOO", 99.0, 4, 4)]);

        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings.positions()[2].symbol(), "VOO");
        assert_eq!(holdings.total_quantity(), 7);
    }

    #[test]
    fn total_cost_sums_positions() {
        let holdings: Holdings = vec![pos("VOO", 100.0, 2, 2), pos("VOO", 50.0, 3, 3)]
            .into_iter()
            .collect();
        assert!((holdings.total_cost() - 350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn symbol_counts_counts_trades_not_shares() {
        let holdings: Holdings = vec![
            pos("VOO", 100.0, 5, 2),
            pos("QQQ", 300.0, 1, 3),
            pos("VOO", 99.0, 4, 4),
        ]
        .into_iter()
        .collect();

        let counts = holdings.symbol_counts();
        assert_eq!(counts.get("VOO"), Some(&2));
        assert_eq!(counts.get("QQQ"), Some(&1));
        assert_eq!(holdings.to_string(), "{QQQ: 1, VOO: 2}");
    }

    #[test]
    fn to_table_has_one_row_per_position() {
        let holdings: Holdings = vec![pos("VOO", 100.5, 2, 2), pos("VOO", 99.0, 1, 3)]
            .into_iter()
            .collect();

        let table = holdings.to_table();
        assert_eq!(table.columns, vec!["symbol", "price", "quantity", "date"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["VOO", "100.5", "2", "2024-01-02"]);
        assert_eq!(table.rows[1], vec!["VOO", "99", "1", "2024-01-03"]);
    }

    #[test]
    fn empty_table_keeps_columns() {
        let table = Holdings::new().to_table();
        assert_eq!(table.columns.len(), 4);
        assert!(table.rows.is_empty());
        assert_eq!(Holdings::new().to_string(), "{}");
    }
}
