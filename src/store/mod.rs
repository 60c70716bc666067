pub mod events;
pub mod json_backend;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Budget, Expense, ExpenseDraft, MonthKey, UserId};
use crate::errors::ExpenseError;

pub type Result<T> = std::result::Result<T, ExpenseError>;

/// One malformed stored record that was excluded from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub date: Option<NaiveDate>,
    pub id: Option<Uuid>,
    pub reason: String,
}

/// The full current set of one user's well-formed expenses.
///
/// Aggregation always consumes a whole snapshot; no incremental counters
/// are kept anywhere, so a missed notification heals on the next load.
#[derive(Debug, Clone)]
pub struct ExpenseSnapshot {
    pub user: UserId,
    pub expenses: Vec<Expense>,
    pub skipped: Vec<SkippedRecord>,
}

/// Abstraction over the per-user expense and budget store.
///
/// Paths follow `expenses/{uid}/{date}/{expenseId}` and
/// `budgets/{uid}/{monthKey}`; records are stored without `id`/`date`,
/// which are reconstructed from the path on load.
pub trait ExpenseStore: Send + Sync {
    /// Persists a validated draft, assigning its identifier.
    fn create_expense(&self, user: &UserId, draft: ExpenseDraft) -> Result<Expense>;
    /// Rewrites an expense in place; `previous_date` identifies the
    /// partition the record currently lives under.
    fn update_expense(
        &self,
        user: &UserId,
        previous_date: NaiveDate,
        expense: &Expense,
    ) -> Result<()>;
    fn remove_expense(&self, user: &UserId, date: NaiveDate, id: Uuid) -> Result<()>;
    /// Bulk delete of every expense stored under one date.
    fn remove_day(&self, user: &UserId, date: NaiveDate) -> Result<()>;
    fn load_expenses(&self, user: &UserId) -> Result<ExpenseSnapshot>;
    /// Whole-document replace of the month's budget record.
    fn save_budget(&self, user: &UserId, budget: &Budget) -> Result<()>;
    fn load_budget(&self, user: &UserId, month: MonthKey) -> Result<Option<Budget>>;
    /// Subscribes to change notifications scoped to one user.
    fn watch(&self, user: &UserId) -> events::StoreSubscription;
}

pub use events::{SnapshotBus, StoreEvent, StoreEventKind, StoreSubscription};
pub use json_backend::JsonStore;
