//! Budget evaluation and persistence.
//!
//! Classifies spending against configured caps and manages the monthly
//! budget record, including seeding a fresh month from the previous one.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{Budget, Category, MonthKey, UserId};
use crate::store::ExpenseStore;

use super::ServiceResult;

/// Fraction of a cap at which spending counts as near the limit.
fn near_limit_threshold(cap: Decimal) -> Decimal {
    cap * Decimal::new(9, 1)
}

/// Classification of spending against one cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// No cap configured; a valid state, not an error.
    NoLimit,
    Under,
    NearLimit,
    Over,
}

impl BudgetStatus {
    pub fn needs_attention(&self) -> bool {
        matches!(self, BudgetStatus::NearLimit | BudgetStatus::Over)
    }
}

/// One threshold crossing worth surfacing to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    /// `None` for the overall budget, otherwise the category concerned.
    pub category: Option<Category>,
    pub status: BudgetStatus,
    pub spent: Decimal,
    pub cap: Decimal,
}

/// Full evaluation of one month's spending against its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetReport {
    pub month: MonthKey,
    pub overall: BudgetStatus,
    pub by_category: HashMap<Category, BudgetStatus>,
    alerts: Vec<BudgetAlert>,
}

impl BudgetReport {
    /// Every near-limit or over-limit entry, overall included. Overall and
    /// category alerts are never suppressed in favour of each other.
    pub fn alerts(&self) -> &[BudgetAlert] {
        &self.alerts
    }
}

pub struct BudgetService;

impl BudgetService {
    /// Classifies `spent` against an optional cap.
    ///
    /// A cap of exactly zero is a configured limit allowing no spending,
    /// so any spending (or none) is already `Over`. The near-limit
    /// boundary is inclusive: spending exactly 90% of the cap is
    /// `NearLimit`, not `Under`.
    pub fn evaluate(spent: Decimal, cap: Option<Decimal>) -> BudgetStatus {
        let cap = match cap {
            Some(cap) => cap,
            None => return BudgetStatus::NoLimit,
        };
        if spent >= cap {
            BudgetStatus::Over
        } else if spent >= near_limit_threshold(cap) {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::Under
        }
    }

    /// Evaluates every category plus the overall pseudo-category against
    /// the month's budget. Categories with no recorded spending evaluate
    /// at zero spent.
    pub fn evaluate_all(totals: &HashMap<Category, Decimal>, budget: &Budget) -> BudgetReport {
        let overall_spent: Decimal = totals.values().copied().sum();
        let overall = Self::evaluate(overall_spent, budget.overall);

        let mut alerts = Vec::new();
        if overall.needs_attention() {
            if let Some(cap) = budget.overall {
                alerts.push(BudgetAlert {
                    category: None,
                    status: overall,
                    spent: overall_spent,
                    cap,
                });
            }
        }

        let mut by_category = HashMap::new();
        for category in Category::ALL {
            let spent = totals.get(&category).copied().unwrap_or(Decimal::ZERO);
            let status = Self::evaluate(spent, budget.cap(category));
            if status.needs_attention() {
                if let Some(cap) = budget.cap(category) {
                    alerts.push(BudgetAlert {
                        category: Some(category),
                        status,
                        spent,
                        cap,
                    });
                }
            }
            by_category.insert(category, status);
        }

        BudgetReport {
            month: budget.month,
            overall,
            by_category,
            alerts,
        }
    }

    /// Replaces the month's budget record wholesale.
    pub fn save(store: &dyn ExpenseStore, user: &UserId, budget: &Budget) -> ServiceResult<()> {
        store.save_budget(user, budget)?;
        Ok(())
    }

    pub fn load(
        store: &dyn ExpenseStore,
        user: &UserId,
        month: MonthKey,
    ) -> ServiceResult<Option<Budget>> {
        Ok(store.load_budget(user, month)?)
    }

    /// Returns the month's budget, seeding it from the previous month's
    /// record on first visit. A month with no predecessor starts empty
    /// (nothing is persisted until the user saves).
    pub fn ensure_month(
        store: &dyn ExpenseStore,
        user: &UserId,
        month: MonthKey,
    ) -> ServiceResult<Budget> {
        if let Some(existing) = store.load_budget(user, month)? {
            return Ok(existing);
        }
        if let Some(previous) = store.load_budget(user, month.previous())? {
            let seeded = previous.copied_to(month);
            store.save_budget(user, &seeded)?;
            tracing::info!(%user, %month, "seeded budget from previous month");
            return Ok(seeded);
        }
        Ok(Budget::empty(month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn evaluate_without_cap_is_no_limit() {
        assert_eq!(
            BudgetService::evaluate(dec!(50), None),
            BudgetStatus::NoLimit
        );
    }

    #[test]
    fn evaluate_boundaries_around_the_cap() {
        assert_eq!(
            BudgetService::evaluate(dec!(89.99), Some(dec!(100))),
            BudgetStatus::Under
        );
        assert_eq!(
            BudgetService::evaluate(dec!(90), Some(dec!(100))),
            BudgetStatus::NearLimit,
            "the 90% boundary is inclusive on the near side"
        );
        assert_eq!(
            BudgetService::evaluate(dec!(99.99), Some(dec!(100))),
            BudgetStatus::NearLimit
        );
        assert_eq!(
            BudgetService::evaluate(dec!(100), Some(dec!(100))),
            BudgetStatus::Over
        );
    }

    #[test]
    fn zero_cap_is_a_real_limit() {
        assert_eq!(
            BudgetService::evaluate(dec!(0), Some(dec!(0))),
            BudgetStatus::Over
        );
    }

    #[test]
    fn evaluate_all_reports_every_category_and_overall() {
        let mut totals = HashMap::new();
        totals.insert(Category::Food, dec!(250));
        totals.insert(Category::Transport, dec!(10));

        let mut budget = Budget::empty("2024-03".parse().unwrap());
        budget.overall = Some(dec!(260));
        budget.set_cap(Category::Food, Some(dec!(250)));
        budget.set_cap(Category::Transport, Some(dec!(100)));

        let report = BudgetService::evaluate_all(&totals, &budget);
        assert_eq!(report.overall, BudgetStatus::Over);
        assert_eq!(report.by_category[&Category::Food], BudgetStatus::Over);
        assert_eq!(report.by_category[&Category::Transport], BudgetStatus::Under);
        assert_eq!(
            report.by_category[&Category::Entertainment],
            BudgetStatus::NoLimit
        );

        // Both the overall and the category crossing are reported.
        let alerts = report.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.category.is_none()));
        assert!(alerts
            .iter()
            .any(|a| a.category == Some(Category::Food) && a.status == BudgetStatus::Over));
    }

    #[test]
    fn unspent_category_with_cap_is_under_not_missing() {
        let totals = HashMap::new();
        let mut budget = Budget::empty("2024-03".parse().unwrap());
        budget.set_cap(Category::Food, Some(dec!(100)));

        let report = BudgetService::evaluate_all(&totals, &budget);
        assert_eq!(report.by_category[&Category::Food], BudgetStatus::Under);
    }
}
