//! Budgets module - rolling budget periods and run-rate spend forecasts.

mod budgets_model;
mod budgets_service;
mod budgets_traits;

pub use budgets_model::{Budget, BudgetActuals, BudgetPeriod, BudgetPeriodType, BudgetStatus};
pub use budgets_service::BudgetPeriodCalculator;
pub use budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
