//! Daily closing prices and the wide price table they are read from.
//!
//! A `PriceTable` mirrors a provider's close-price export: one row per date,
//! one column per ticker, plus optional feature columns such as `sma_50`.
//! Strategies consume a single symbol's `PricePoint` series, extracted and
//! validated by [`PriceTable::series`].

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::DcatraderError;

pub const DEFAULT_FEATURE_COLUMN: &str = "sma_50";

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub sma_50: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        PricePoint {
            date,
            price,
            sma_50: None,
        }
    }

    pub fn with_sma(date: NaiveDate, price: f64, sma_50: f64) -> Self {
        PricePoint {
            date,
            price,
            sma_50: Some(sma_50),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: HashMap<String, Vec<Option<f64>>>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl PriceTable {
    pub fn new(dates: Vec<NaiveDate>, columns: HashMap<String, Vec<Option<f64>>>) -> Self {
        let date_index = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        PriceTable {
            dates,
            columns,
            date_index,
        }
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn value(&self, column: &str, date: NaiveDate) -> Option<f64> {
        let i = *self.date_index.get(&date)?;
        self.columns.get(column)?.get(i).copied().flatten()
    }

    /// Extract one symbol as a validated series.
    ///
    /// The symbol column must exist and hold a value on every row. The
    /// feature column is optional; when present its blank cells stay `None`
    /// (a moving average is undefined for the first rows of a history).
    pub fn series(
        &self,
        symbol: &str,
        feature_column: &str,
    ) -> Result<Vec<PricePoint>, DcatraderError> {
        let prices = self
            .columns
            .get(symbol)
            .ok_or_else(|| DcatraderError::MissingField {
                field: symbol.to_string(),
            })?;
        let features = self.columns.get(feature_column);

        let mut points = Vec::with_capacity(self.dates.len());
        for (i, date) in self.dates.iter().enumerate() {
            let price = prices.get(i).copied().flatten().ok_or_else(|| {
                DcatraderError::MissingValue {
                    field: symbol.to_string(),
                    date: *date,
                }
            })?;
            let sma_50 = features.and_then(|f| f.get(i).copied().flatten());
            points.push(PricePoint {
                date: *date,
                price,
                sma_50,
            });
        }

        if points.is_empty() {
            return Err(DcatraderError::EmptySeries {
                symbol: symbol.to_string(),
            });
        }
        validate_series(&points)?;
        Ok(points)
    }
}

/// Check the preconditions every simulation relies on: strictly increasing
/// dates, finite positive prices, finite positive moving averages.
pub fn validate_series(points: &[PricePoint]) -> Result<(), DcatraderError> {
    let mut previous: Option<NaiveDate> = None;
    for point in points {
        if let Some(prev) = previous {
            if point.date == prev {
                return Err(DcatraderError::DuplicateDate { date: point.date });
            }
            if point.date < prev {
                return Err(DcatraderError::UnsortedDates {
                    previous: prev,
                    date: point.date,
                });
            }
        }
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(DcatraderError::InvalidPrice {
                date: point.date,
                price: point.price,
            });
        }
        if let Some(sma) = point.sma_50 {
            if !sma.is_finite() || sma <= 0.0 {
                return Err(DcatraderError::InvalidPrice {
                    date: point.date,
                    price: sma,
                });
            }
        }
        previous = Some(point.date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        let mut columns = HashMap::new();
        columns.insert("VOO".to_string(), vec![Some(400.0), Some(401.0), Some(399.0)]);
        columns.insert("QQQ".to_string(), vec![Some(350.0), None, Some(352.0)]);
        columns.insert("sma_50".to_string(), vec![None, Some(398.0), Some(398.5)]);
        PriceTable::new(vec![d(2), d(3), d(4)], columns)
    }

    #[test]
    fn table_builds_date_index() {
        let table = sample_table();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.date_index.get(&d(3)), Some(&1));
        assert_eq!(table.value("VOO", d(4)), Some(399.0));
        assert_eq!(table.value("QQQ", d(3)), None);
        assert_eq!(table.value("VOO", d(9)), None);
    }

    #[test]
    fn series_extracts_symbol_with_feature() {
        let table = sample_table();
        let series = table.series("VOO", DEFAULT_FEATURE_COLUMN).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0], PricePoint::new(d(2), 400.0));
        assert_eq!(series[1], PricePoint::with_sma(d(3), 401.0, 398.0));
    }

    #[test]
    fn series_without_feature_column() {
        let table = sample_table();
        let series = table.series("VOO", "sma_200").unwrap();
        assert!(series.iter().all(|p| p.sma_50.is_none()));
    }

    #[test]
    fn series_missing_symbol_column() {
        let table = sample_table();
        let err = table.series("SPY", DEFAULT_FEATURE_COLUMN).unwrap_err();
        assert!(matches!(err, DcatraderError::MissingField { field } if field == "SPY"));
    }

    #[test]
    fn series_blank_price_cell() {
        let table = sample_table();
        let err = table.series("QQQ", DEFAULT_FEATURE_COLUMN).unwrap_err();
        assert!(matches!(
            err,
            DcatraderError::MissingValue { field, date } if field == "QQQ" && date == d(3)
        ));
    }

    #[test]
    fn series_empty_table() {
        let mut columns = HashMap::new();
        columns.insert("VOO".to_string(), Vec::new());
        let table = PriceTable::new(Vec::new(), columns);
        let err = table.series("VOO", DEFAULT_FEATURE_COLUMN).unwrap_err();
        assert!(matches!(err, DcatraderError::EmptySeries { .. }));
    }

    #[test]
    fn validate_accepts_sorted_unique() {
        let points = vec![PricePoint::new(d(2), 10.0), PricePoint::new(d(3), 11.0)];
        assert!(validate_series(&points).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let points = vec![PricePoint::new(d(2), 10.0), PricePoint::new(d(2), 11.0)];
        let err = validate_series(&points).unwrap_err();
        assert!(matches!(err, DcatraderError::DuplicateDate { date } if date == d(2)));
    }

    #[test]
    fn validate_rejects_unsorted_dates() {
        let points = vec![PricePoint::new(d(3), 10.0), PricePoint::new(d(2), 11.0)];
        let err = validate_series(&points).unwrap_err();
        assert!(matches!(err, DcatraderError::UnsortedDates { .. }));
    }

    #[test]
    fn validate_rejects_non_positive_price() {
        let zero = vec![PricePoint::new(d(2), 0.0)];
        let negative = vec![PricePoint::new(d(2), -1.0)];
        let nan = vec![PricePoint::new(d(2), f64::NAN)];
        assert!(matches!(
            validate_series(&zero),
            Err(DcatraderError::InvalidPrice { .. })
        ));
        assert!(matches!(
            validate_series(&negative),
            Err(DcatraderError::InvalidPrice { .. })
        ));
        assert!(matches!(
            validate_series(&nan),
            Err(DcatraderError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_sma() {
        let points = vec![PricePoint::with_sma(d(2), 10.0, 0.0)];
        assert!(matches!(
            validate_series(&points),
            Err(DcatraderError::InvalidPrice { .. })
        ));
    }
}
