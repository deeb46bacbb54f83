//! Performance summary of a completed run.

/// `round(x, 5)` on the exact binary value of `x`.
///
/// Scaling by 1e5 first picks up representation error (3.064125 stored just
/// below the tie would round up), so the digits come from the formatter,
/// which rounds the exact decimal expansion.
fn round5(x: f64) -> f64 {
    format!("{x:.5}").parse::<f64>().unwrap_or(x)
}

/// Price performance over the walked series.
///
/// Only the always-buy kinds report a figure; the drawdown kinds never
/// defined one, so they carry `NotComputed` rather than a guessed formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Performance {
    Computed { gains: f64, gains_pct: f64 },
    NotComputed,
}

impl Performance {
    /// gains = end - start, gains_pct = round(end / start, 5) - 1
    pub fn compute(start_price: f64, end_price: f64) -> Self {
        Performance::Computed {
            gains: end_price - start_price,
            gains_pct: round5(end_price / start_price) - 1.0,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Performance::Computed { .. })
    }

    pub fn gains(&self) -> Option<f64> {
        match self {
            Performance::Computed { gains, .. } => Some(*gains),
            Performance::NotComputed => None,
        }
    }

    pub fn gains_pct(&self) -> Option<f64> {
        match self {
            Performance::Computed { gains_pct, .. } => Some(*gains_pct),
            Performance::NotComputed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compute_gain() {
        let perf = Performance::compute(100.0, 120.0);
        assert_eq!(perf.gains(), Some(20.0));
        assert_relative_eq!(perf.gains_pct().unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn compute_loss() {
        let perf = Performance::compute(200.0, 150.0);
        assert_eq!(perf.gains(), Some(-50.0));
        assert_relative_eq!(perf.gains_pct().unwrap(), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn gains_pct_rounds_ratio_to_five_places() {
        // 103.456789 / 100 = 1.03456789 -> 1.03457
        let perf = Performance::compute(100.0, 103.456789);
        assert_eq!(perf.gains_pct(), Some(round5(1.03456789) - 1.0));
        assert_relative_eq!(perf.gains_pct().unwrap(), 0.03457, epsilon = 1e-12);
    }

    #[test]
    fn gains_pct_rounds_stored_value_not_scaled_value() {
        // 245.13 / 80 is stored just below 3.064125
        let perf = Performance::compute(80.0, 245.13);
        assert_eq!(perf.gains_pct(), Some(3.06412 - 1.0));
        assert_relative_eq!(perf.gains().unwrap(), 165.13, epsilon = 1e-9);
    }

    #[test]
    fn not_computed_has_no_figures() {
        let perf = Performance::NotComputed;
        assert!(!perf.is_computed());
        assert_eq!(perf.gains(), None);
        assert_eq!(perf.gains_pct(), None);
    }
}
