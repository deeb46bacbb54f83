//! Report generation port trait.

use crate::domain::backtest::ContributionLedger;
use crate::domain::error::DcatraderError;
use crate::domain::holdings::Holdings;

/// Port for exporting simulation results.
pub trait ReportPort {
    fn write_holdings(&self, holdings: &Holdings, output_path: &str) -> Result<(), DcatraderError>;

    fn write_ledger(
        &self,
        ledger: &ContributionLedger,
        output_path: &str,
    ) -> Result<(), DcatraderError>;
}
