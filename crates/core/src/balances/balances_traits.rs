use crate::balances::balances_model::BalanceSnapshot;
use crate::errors::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BalanceRepositoryTrait: Send + Sync {
    /// The owner's current snapshot, if one was ever recorded.
    fn get_current(&self, owner_id: &str) -> Result<Option<BalanceSnapshot>>;

    /// Records a new snapshot and makes it the current one.
    async fn record(&self, snapshot: BalanceSnapshot) -> Result<BalanceSnapshot>;
}
