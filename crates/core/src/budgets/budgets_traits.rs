use crate::budgets::budgets_model::{Budget, BudgetStatus};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, budget_id: &str) -> Result<Option<Budget>>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Budget>>;
    async fn create(&self, budget: Budget) -> Result<Budget>;
}

#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    /// Current period of the budget as of `today` and the spend within it.
    async fn status(&self, budget_id: &str, today: NaiveDate) -> Result<BudgetStatus>;
}
