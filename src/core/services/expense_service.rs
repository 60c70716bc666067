//! Validated CRUD helpers over the expense store.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Expense, ExpenseDraft, UserId};
use crate::store::{ExpenseSnapshot, ExpenseStore};

use super::{ServiceError, ServiceResult};

/// Entry boundary between user input and the store. Every call takes the
/// owning user explicitly.
pub struct ExpenseService;

impl ExpenseService {
    /// Validates a draft and persists it; the store assigns the id.
    pub fn add(
        store: &dyn ExpenseStore,
        user: &UserId,
        draft: ExpenseDraft,
    ) -> ServiceResult<Expense> {
        draft.validate()?;
        Ok(store.create_expense(user, draft)?)
    }

    /// Applies an edit. When the date changed, the record moves to its new
    /// date partition; `previous_date` names the partition it came from.
    pub fn update(
        store: &dyn ExpenseStore,
        user: &UserId,
        previous_date: NaiveDate,
        expense: &Expense,
    ) -> ServiceResult<()> {
        if expense.title.trim().is_empty() {
            return Err(ServiceError::Invalid("title must not be empty".into()));
        }
        if expense.amount <= rust_decimal::Decimal::ZERO {
            return Err(ServiceError::Invalid(format!(
                "amount must be positive, got {}",
                expense.amount
            )));
        }
        store.update_expense(user, previous_date, expense)?;
        Ok(())
    }

    pub fn remove(
        store: &dyn ExpenseStore,
        user: &UserId,
        date: NaiveDate,
        id: Uuid,
    ) -> ServiceResult<()> {
        store.remove_expense(user, date, id)?;
        Ok(())
    }

    /// Deletes every expense recorded under one date.
    pub fn remove_day(
        store: &dyn ExpenseStore,
        user: &UserId,
        date: NaiveDate,
    ) -> ServiceResult<()> {
        store.remove_day(user, date)?;
        Ok(())
    }

    /// The full current snapshot for this user.
    pub fn snapshot(store: &dyn ExpenseStore, user: &UserId) -> ServiceResult<ExpenseSnapshot> {
        Ok(store.load_expenses(user)?)
    }
}
