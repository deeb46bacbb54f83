//! CSV closing-price adapter.
//!
//! Reads the table a market-data provider's close-price export produces:
//!
//! ```text
//! Date,VOO,QQQ,sma_50
//! 2023-10-02,392.10,358.20,401.55
//! ```
//!
//! Ticker headers are matched case-insensitively. Blank cells are kept as
//! missing values so the domain can decide whether they matter.

use crate::domain::error::DcatraderError;
use crate::domain::price_series::{DEFAULT_FEATURE_COLUMN, PriceTable};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_DATE_COLUMN: &str = "Date";

pub struct CsvPriceAdapter {
    path: PathBuf,
    date_column: String,
    feature_column: String,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            feature_column: DEFAULT_FEATURE_COLUMN.to_string(),
        }
    }

    pub fn with_date_column(mut self, column: &str) -> Self {
        self.date_column = column.to_string();
        self
    }

    pub fn with_feature_column(mut self, column: &str) -> Self {
        self.feature_column = column.to_string();
        self
    }

    fn read_records(&self) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), DcatraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| DcatraderError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| DcatraderError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let mut records = Vec::new();
        for result in rdr.records() {
            records.push(result.map_err(|e| DcatraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?);
        }
        Ok((headers, records))
    }

    fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    }
}

/// Accepts plain dates and provider timestamps such as `2023-10-02 00:00:00`.
fn parse_date(raw: &str) -> Result<NaiveDate, DcatraderError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"))
        .map_err(|e| DcatraderError::Data {
            reason: format!("invalid date '{}': {}", raw, e),
        })
}

fn parse_cell(raw: Option<&str>, column: &str) -> Result<Option<f64>, DcatraderError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|e| DcatraderError::Data {
            reason: format!("invalid {} value '{}': {}", column, s, e),
        }),
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, DcatraderError> {
        let (headers, records) = self.read_records()?;

        let date_idx = Self::column_index(&headers, &self.date_column).ok_or_else(|| {
            DcatraderError::MissingField {
                field: self.date_column.clone(),
            }
        })?;

        let mut wanted: Vec<(String, usize)> = Vec::with_capacity(tickers.len() + 1);
        for ticker in tickers {
            let symbol = ticker.trim().to_uppercase();
            let idx = Self::column_index(&headers, &symbol)
                .ok_or_else(|| DcatraderError::MissingField { field: symbol.clone() })?;
            wanted.push((symbol, idx));
        }
        if let Some(idx) = Self::column_index(&headers, &self.feature_column) {
            wanted.push((self.feature_column.clone(), idx));
        }

        let mut dates = Vec::with_capacity(records.len());
        let mut columns: HashMap<String, Vec<Option<f64>>> = wanted
            .iter()
            .map(|(name, _)| (name.clone(), Vec::with_capacity(records.len())))
            .collect();

        for record in &records {
            let date = parse_date(record.get(date_idx).unwrap_or_default())?;
            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }
            for (name, idx) in &wanted {
                let value = parse_cell(record.get(*idx), name)?;
                if let Some(col) = columns.get_mut(name) {
                    col.push(value);
                }
            }
            dates.push(date);
        }

        log::debug!(
            "read {} rows for {} from {}",
            dates.len(),
            tickers.join(","),
            self.path.display()
        );
        Ok(PriceTable::new(dates, columns))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DcatraderError> {
        let (headers, _) = self.read_records()?;
        let mut symbols: Vec<String> = headers
            .iter()
            .map(str::trim)
            .filter(|h| {
                !h.is_empty()
                    && !h.eq_ignore_ascii_case(&self.date_column)
                    && !h.eq_ignore_ascii_case(&self.feature_column)
            })
            .map(str::to_uppercase)
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}
