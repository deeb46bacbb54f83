//! Strategy configuration.
//!
//! The four investment styles differ only in their decision rule and in
//! whether monthly income tops up the cash balance, so they share one
//! `StrategyConfig` selected by `StrategyKind`.

use std::fmt;
use std::str::FromStr;

use super::decision::{DEEP_TIER_CAP, DrawdownParams};
use super::price_series::DEFAULT_FEATURE_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    BuyAndHold,
    Drawdown,
    DollarCostAveraging,
    DcaDrawdown,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::BuyAndHold,
        StrategyKind::Drawdown,
        StrategyKind::DollarCostAveraging,
        StrategyKind::DcaDrawdown,
    ];

    pub fn uses_drawdown(self) -> bool {
        matches!(self, StrategyKind::Drawdown | StrategyKind::DcaDrawdown)
    }

    pub fn takes_income(self) -> bool {
        matches!(
            self,
            StrategyKind::DollarCostAveraging | StrategyKind::DcaDrawdown
        )
    }

    pub fn computes_performance(self) -> bool {
        !self.uses_drawdown()
    }

    /// Share cap for the deepest drawdown tier; `None` spends all cash.
    pub fn deep_tier_cap(self) -> Option<i64> {
        match self {
            StrategyKind::DcaDrawdown => None,
            _ => Some(DEEP_TIER_CAP),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "buy_and_hold",
            StrategyKind::Drawdown => "drawdown",
            StrategyKind::DollarCostAveraging => "dca",
            StrategyKind::DcaDrawdown => "dca_drawdown",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy_and_hold" | "buy-and-hold" | "hold" => Ok(StrategyKind::BuyAndHold),
            "drawdown" | "buy_and_hold_drawdown" => Ok(StrategyKind::Drawdown),
            "dca" | "dollar_cost_averaging" => Ok(StrategyKind::DollarCostAveraging),
            "dca_drawdown" | "dca-drawdown" => Ok(StrategyKind::DcaDrawdown),
            other => Err(format!(
                "unknown strategy '{other}' (expected buy_and_hold, drawdown, dca or dca_drawdown)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub symbol: String,
    pub kind: StrategyKind,
    pub initial_cash: f64,
    /// Monthly top-up for income-taking kinds; ignored by the others.
    pub income: f64,
    pub drawdown: DrawdownParams,
    /// Name of the moving-average column the drawdown rules read.
    pub feature_column: String,
}

impl StrategyConfig {
    pub fn new(symbol: &str, kind: StrategyKind, initial_cash: f64) -> Self {
        StrategyConfig {
            symbol: symbol.trim().to_uppercase(),
            kind,
            initial_cash,
            income: 0.0,
            drawdown: DrawdownParams::default(),
            feature_column: DEFAULT_FEATURE_COLUMN.to_string(),
        }
    }

    pub fn with_income(mut self, income: f64) -> Self {
        self.income = income;
        self
    }

    pub fn with_drawdown(mut self, drawdown: DrawdownParams) -> Self {
        self.drawdown = drawdown;
        self
    }

    pub fn with_feature_column(mut self, column: &str) -> Self {
        self.feature_column = column.to_string();
        self
    }
}
