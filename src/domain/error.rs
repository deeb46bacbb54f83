//! Domain error types.

use chrono::NaiveDate;

use super::universe::UniverseError;

/// Top-level error type for dcatrader.
#[derive(Debug, thiserror::Error)]
pub enum DcatraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("missing value for {field} on {date}")]
    MissingValue { field: String, date: NaiveDate },

    #[error("invalid price {price} on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, price: f64 },

    #[error("dates out of order: {date} follows {previous}")]
    UnsortedDates { previous: NaiveDate, date: NaiveDate },

    #[error("duplicate date: {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("no price data for {symbol}")]
    EmptySeries { symbol: String },

    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("insufficient cash: have {cash:.2}, need {cost:.2}")]
    InsufficientCash { cash: f64, cost: f64 },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DcatraderError> for std::process::ExitCode {
    fn from(err: &DcatraderError) -> Self {
        let code: u8 = match err {
            DcatraderError::Io(_) => 1,
            DcatraderError::ConfigParse { .. }
            | DcatraderError::ConfigMissing { .. }
            | DcatraderError::ConfigInvalid { .. } => 2,
            DcatraderError::InvalidQuantity { .. } | DcatraderError::InsufficientCash { .. } => 3,
            DcatraderError::MissingField { .. }
            | DcatraderError::MissingValue { .. }
            | DcatraderError::InvalidPrice { .. }
            | DcatraderError::UnsortedDates { .. }
            | DcatraderError::DuplicateDate { .. } => 4,
            DcatraderError::EmptySeries { .. }
            | DcatraderError::Data { .. }
            | DcatraderError::Universe(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
