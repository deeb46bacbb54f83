//! CSV export of holdings and the contribution ledger.

use crate::domain::backtest::ContributionLedger;
use crate::domain::error::DcatraderError;
use crate::domain::holdings::Holdings;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

fn csv_error(path: &str, e: impl std::fmt::Display) -> DcatraderError {
    DcatraderError::Data {
        reason: format!("failed to write {}: {}", path, e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_holdings(&self, holdings: &Holdings, output_path: &str) -> Result<(), DcatraderError> {
        let table = holdings.to_table();
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        wtr.write_record(&table.columns)
            .map_err(|e| csv_error(output_path, e))?;
        for row in &table.rows {
            wtr.write_record(row).map_err(|e| csv_error(output_path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_ledger(
        &self,
        ledger: &ContributionLedger,
        output_path: &str,
    ) -> Result<(), DcatraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        wtr.write_record(["date", "contribution", "cash_available"])
            .map_err(|e| csv_error(output_path, e))?;
        for (date, entry) in ledger {
            wtr.write_record([
                date.format("%Y-%m-%d").to_string(),
                entry.contribution.to_string(),
                entry.cash_available.to_string(),
            ])
            .map_err(|e| csv_error(output_path, e))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
