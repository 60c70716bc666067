pub mod aggregation_service;
pub mod budget_service;
pub mod expense_service;

pub use aggregation_service::{AggregationService, DaySummary};
pub use budget_service::{BudgetAlert, BudgetReport, BudgetService, BudgetStatus};
pub use expense_service::ExpenseService;

use crate::errors::ExpenseError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] ExpenseError),
    #[error("{0}")]
    Invalid(String),
}
