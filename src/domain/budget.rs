use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::MonthKey;
use super::expense::Category;

/// Spending caps for one calendar month, overall and per category.
///
/// An absent cap means "no limit configured" and is distinct from a cap of
/// zero, which is a real limit allowing no spending. A save replaces the
/// whole month's record; there is no partial merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub month: MonthKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entertainment: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilities: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Decimal>,
}

impl Budget {
    /// A month with nothing configured yet.
    pub fn empty(month: MonthKey) -> Self {
        Self {
            month,
            overall: None,
            food: None,
            transport: None,
            entertainment: None,
            utilities: None,
            others: None,
        }
    }

    pub fn cap(&self, category: Category) -> Option<Decimal> {
        match category {
            Category::Food => self.food,
            Category::Transport => self.transport,
            Category::Entertainment => self.entertainment,
            Category::Utilities => self.utilities,
            Category::Others => self.others,
        }
    }

    pub fn set_cap(&mut self, category: Category, cap: Option<Decimal>) {
        match category {
            Category::Food => self.food = cap,
            Category::Transport => self.transport = cap,
            Category::Entertainment => self.entertainment = cap,
            Category::Utilities => self.utilities = cap,
            Category::Others => self.others = cap,
        }
    }

    /// Duplicates every cap into a record for another month, used when
    /// seeding a month that has no budget yet.
    pub fn copied_to(&self, month: MonthKey) -> Self {
        Self {
            month,
            ..self.clone()
        }
    }
}
