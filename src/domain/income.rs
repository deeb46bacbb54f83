//! Scheduled cash injections for dollar-cost averaging.
//!
//! Income lands on the last observed trading day of each calendar month.
//! "Observed" matters: a month whose final calendar days are missing from
//! the series still gets an income date, the latest one present.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

use super::price_series::PricePoint;

/// Latest date seen within every (year, month) group.
pub fn income_dates(points: &[PricePoint]) -> BTreeSet<NaiveDate> {
    let mut latest: BTreeMap<(i32, u32), NaiveDate> = BTreeMap::new();
    for point in points {
        let key = (point.date.year(), point.date.month());
        latest
            .entry(key)
            .and_modify(|d| {
                if point.date > *d {
                    *d = point.date;
                }
            })
            .or_insert(point.date);
    }
    latest.into_values().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeSchedule {
    pub amount: f64,
    pub dates: BTreeSet<NaiveDate>,
}

impl IncomeSchedule {
    pub fn monthly(amount: f64, points: &[PricePoint]) -> Self {
        IncomeSchedule {
            amount,
            dates: income_dates(points),
        }
    }

    pub fn is_income_date(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Amount credited on `date`, zero off-schedule.
    pub fn income_on(&self, date: NaiveDate) -> f64 {
        if self.is_income_date(date) {
            self.amount
        } else {
            0.0
        }
    }
}
