//! Domain models for expenses, budgets, and the identifiers they hang off.

pub mod budget;
pub mod common;
pub mod expense;

pub use budget::Budget;
pub use common::{MonthKey, UserId};
pub use expense::{parse_amount, Category, Expense, ExpenseDraft};
