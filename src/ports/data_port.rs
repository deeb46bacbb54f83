//! Market data access port trait.

use crate::domain::error::DcatraderError;
use crate::domain::price_series::PriceTable;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Closing prices for `tickers` between `start_date` and `end_date`
    /// inclusive; `None` leaves that side of the range open.
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceTable, DcatraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, DcatraderError>;
}
