//! Pure aggregations over an expense snapshot.
//!
//! Every function here is a function of its inputs only: no I/O, no
//! mutation of the slice it is given. The dashboard and budget evaluator
//! both recompute from the full snapshot on every change.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{Category, Expense, MonthKey};

/// Per-date rollup for the dashboard table.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: Decimal,
    pub count: usize,
}

pub struct AggregationService;

impl AggregationService {
    /// Groups expenses under their date partition. Insertion order within
    /// a group follows input order; dates with no expenses do not appear.
    pub fn group_by_date(expenses: &[Expense]) -> BTreeMap<NaiveDate, Vec<Expense>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<Expense>> = BTreeMap::new();
        for expense in expenses {
            grouped.entry(expense.date).or_default().push(expense.clone());
        }
        grouped
    }

    /// Sums amounts per category. Categories absent from the input do not
    /// appear in the result; they are not zero-filled.
    pub fn group_by_category(expenses: &[Expense]) -> HashMap<Category, Decimal> {
        let mut totals: HashMap<Category, Decimal> = HashMap::new();
        for expense in expenses {
            *totals.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
        }
        totals
    }

    /// Total spent within one calendar month, by exact year+month match.
    pub fn total_for_month(expenses: &[Expense], month: MonthKey) -> Decimal {
        expenses
            .iter()
            .filter(|expense| month.contains(expense.date))
            .map(|expense| expense.amount)
            .sum()
    }

    /// Sorts date keys newest first, by calendar value.
    pub fn sort_dates_descending(dates: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut sorted = dates.to_vec();
        sorted.sort_by(|a, b| b.cmp(a));
        sorted
    }

    /// Per-date totals and counts, newest first, for the dashboard table.
    pub fn day_summaries(expenses: &[Expense]) -> Vec<DaySummary> {
        Self::group_by_date(expenses)
            .into_iter()
            .rev()
            .map(|(date, group)| DaySummary {
                date,
                total: group.iter().map(|expense| expense.amount).sum(),
                count: group.len(),
            })
            .collect()
    }

    /// Total spent per month across the whole history, oldest first.
    pub fn totals_by_month(expenses: &[Expense]) -> BTreeMap<MonthKey, Decimal> {
        let mut totals: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
        for expense in expenses {
            *totals
                .entry(MonthKey::of(expense.date))
                .or_insert(Decimal::ZERO) += expense.amount;
        }
        totals
    }
}
