//! Domain types representing a single spending event.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ExpenseError;

/// The fixed set of spending categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Utilities,
        Category::Others,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Others => "Others",
        };
        f.write_str(label)
    }
}

impl FromStr for Category {
    type Err = ExpenseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Food" => Ok(Category::Food),
            "Transport" => Ok(Category::Transport),
            "Entertainment" => Ok(Category::Entertainment),
            "Utilities" => Ok(Category::Utilities),
            "Others" => Ok(Category::Others),
            other => Err(ExpenseError::Validation(format!(
                "unknown category `{other}`"
            ))),
        }
    }
}

/// A single dated, categorized spending record.
///
/// The `id` is assigned by the store on creation; `date` is the partition
/// key the record lives under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
}

/// User-submitted expense fields, validated before they reach the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    pub fn new(
        title: impl Into<String>,
        amount: Decimal,
        category: Category,
        date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            category,
            date,
        }
    }

    /// Checks the entry-boundary contract: non-empty title, positive amount.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.title.trim().is_empty() {
            return Err(ExpenseError::Validation("title must not be empty".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ExpenseError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Parses a user-typed amount, rejecting malformed input instead of
/// coercing it to zero.
pub fn parse_amount(raw: &str) -> Result<Decimal, ExpenseError> {
    let trimmed = raw.trim();
    let value = Decimal::from_str_exact(trimmed)
        .map_err(|_| ExpenseError::Validation(format!("amount `{raw}` is not a number")))?;
    if value <= Decimal::ZERO {
        return Err(ExpenseError::Validation(format!(
            "amount must be positive, got {value}"
        )));
    }
    Ok(value)
}
