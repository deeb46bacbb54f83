#![allow(dead_code)]

use chrono::NaiveDate;
use dcatrader::domain::backtest::ContributionLedger;
use dcatrader::domain::error::DcatraderError;
use dcatrader::domain::holdings::Holdings;
pub use dcatrader::domain::price_series::PricePoint;
use dcatrader::domain::price_series::{PriceTable, DEFAULT_FEATURE_COLUMN};
use dcatrader::ports::data_port::PriceDataPort;
use dcatrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, DcatraderError> {
        let in_range = |d: NaiveDate| {
            start_date.is_none_or(|s| d >= s) && end_date.is_none_or(|e| d <= e)
        };

        let mut dates = BTreeSet::new();
        for ticker in tickers {
            if let Some(reason) = self.errors.get(ticker) {
                return Err(DcatraderError::Data {
                    reason: reason.clone(),
                });
            }
            let points = self
                .data
                .get(ticker)
                .ok_or_else(|| DcatraderError::MissingField {
                    field: ticker.clone(),
                })?;
            dates.extend(points.iter().map(|p| p.date).filter(|d| in_range(*d)));
        }
        let dates: Vec<NaiveDate> = dates.into_iter().collect();

        let mut columns = HashMap::new();
        let mut sma = vec![None; dates.len()];
        for ticker in tickers {
            let by_date: HashMap<NaiveDate, &PricePoint> =
                self.data[ticker].iter().map(|p| (p.date, p)).collect();
            let column: Vec<Option<f64>> = dates
                .iter()
                .map(|d| by_date.get(d).map(|p| p.price))
                .collect();
            for (i, d) in dates.iter().enumerate() {
                if let Some(value) = by_date.get(d).and_then(|p| p.sma_50) {
                    sma[i] = Some(value);
                }
            }
            columns.insert(ticker.clone(), column);
        }
        columns.insert(DEFAULT_FEATURE_COLUMN.to_string(), sma);

        Ok(PriceTable::new(dates, columns))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DcatraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Records what the CLI asked to be written instead of touching disk.
pub struct RecordingReportPort {
    pub holdings: RefCell<Vec<(String, Holdings)>>,
    pub ledgers: RefCell<Vec<(String, ContributionLedger)>>,
}

impl RecordingReportPort {
    pub fn new() -> Self {
        Self {
            holdings: RefCell::new(Vec::new()),
            ledgers: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReportPort {
    fn write_holdings(&self, holdings: &Holdings, output_path: &str) -> Result<(), DcatraderError> {
        self.holdings
            .borrow_mut()
            .push((output_path.to_string(), holdings.clone()));
        Ok(())
    }

    fn write_ledger(
        &self,
        ledger: &ContributionLedger,
        output_path: &str,
    ) -> Result<(), DcatraderError> {
        self.ledgers
            .borrow_mut()
            .push((output_path.to_string(), ledger.clone()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_series(rows: &[(&str, f64)]) -> Vec<PricePoint> {
    rows.iter()
        .map(|(d, price)| PricePoint::new(parse_date(d), *price))
        .collect()
}

pub fn make_sma_series(rows: &[(&str, f64, f64)]) -> Vec<PricePoint> {
    rows.iter()
        .map(|(d, price, sma)| PricePoint::with_sma(parse_date(d), *price, *sma))
        .collect()
}

/// Consecutive calendar days from `start_date`, priced by `price_at(i)`.
pub fn generate_series(
    start_date: &str,
    count: usize,
    price_at: impl Fn(usize) -> f64,
) -> Vec<PricePoint> {
    let start = parse_date(start_date);
    (0..count)
        .map(|i| PricePoint::new(start + chrono::Duration::days(i as i64), price_at(i)))
        .collect()
}
