//! Simulation loop: one forward pass over a daily price series.
//!
//! Each day, in order:
//! 1. Credit scheduled income (income-taking kinds, last trading day of month)
//! 2. Record the contribution ledger entry
//! 3. Ask the decision rule whether and how much to buy
//! 4. Execute the buy against the cash balance
//!
//! The run returns an immutable [`SimulationResult`]; nothing is left
//! half-filled on the strategy.

use chrono::NaiveDate;
use rand::Rng;
use std::collections::BTreeMap;

use super::decision::{self, DecisionInput};
use super::error::DcatraderError;
use super::execution::execute_buy;
use super::holdings::Holdings;
use super::income::IncomeSchedule;
use super::metrics::Performance;
use super::price_series::{validate_series, PricePoint};
use super::strategy::{StrategyConfig, StrategyKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry {
    pub contribution: f64,
    /// Cash on hand after the day's contribution, before the day's buy.
    pub cash_available: f64,
}

pub type ContributionLedger = BTreeMap<NaiveDate, LedgerEntry>;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub symbol: String,
    pub kind: StrategyKind,
    pub holdings: Holdings,
    pub final_cash: f64,
    pub total_contributed: f64,
    pub start: Snapshot,
    pub end: Snapshot,
    pub performance: Performance,
    pub ledger: ContributionLedger,
}

impl SimulationResult {
    pub fn shares_held(&self) -> i64 {
        self.holdings.total_quantity()
    }

    /// Holdings valued at the last price plus leftover cash.
    pub fn final_value(&self) -> f64 {
        let marked: f64 = self
            .holdings
            .positions()
            .iter()
            .map(|p| p.market_value(self.end.price))
            .sum();
        self.final_cash + marked
    }

    pub fn average_cost(&self) -> Option<f64> {
        let shares = self.shares_held();
        if shares > 0 {
            Some(self.holdings.total_cost() / shares as f64)
        } else {
            None
        }
    }
}

pub fn run_simulation<R: Rng + ?Sized>(
    config: &StrategyConfig,
    series: &[PricePoint],
    rng: &mut R,
) -> Result<SimulationResult, DcatraderError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(DcatraderError::EmptySeries {
                symbol: config.symbol.clone(),
            })
        }
    };
    validate_series(series)?;

    let kind = config.kind;
    let schedule = kind
        .takes_income()
        .then(|| IncomeSchedule::monthly(config.income, series));

    log::info!(
        "simulating {} {} over {} days ({} to {})",
        kind,
        config.symbol,
        series.len(),
        first.date,
        last.date
    );

    let mut cash = config.initial_cash;
    let mut total_contributed = config.initial_cash;
    let mut holdings = Holdings::new();
    let mut ledger = ContributionLedger::new();

    for point in series {
        if let Some(schedule) = &schedule {
            let contribution = schedule.income_on(point.date);
            if contribution > 0.0 {
                cash += contribution;
                total_contributed += contribution;
                log::debug!("{}: income {:.2}, cash {:.2}", point.date, contribution, cash);
            }
            ledger.insert(
                point.date,
                LedgerEntry {
                    contribution,
                    cash_available: cash,
                },
            );
        }

        let input = DecisionInput {
            date: point.date,
            price: point.price,
            sma_50: point.sma_50,
            feature_column: &config.feature_column,
            cash,
            trades_so_far: holdings.len(),
        };
        let decision = decision::decide(kind, &input, &config.drawdown, rng)?;

        if decision.buy {
            let remaining = execute_buy(
                &mut holdings,
                cash,
                &config.symbol,
                point.price,
                point.date,
                decision.quantity,
            )?;
            cash = remaining;
        }
    }

    let performance = if kind.computes_performance() {
        Performance::compute(first.price, last.price)
    } else {
        Performance::NotComputed
    };

    log::info!(
        "{} {}: {} trades, {} shares, cash {:.2}",
        kind,
        config.symbol,
        holdings.len(),
        holdings.total_quantity(),
        cash
    );

    Ok(SimulationResult {
        symbol: config.symbol.clone(),
        kind,
        holdings,
        final_cash: cash,
        total_contributed,
        start: Snapshot {
            date: first.date,
            price: first.price,
        },
        end: Snapshot {
            date: last.date,
            price: last.price,
        },
        performance,
        ledger,
    })
}
