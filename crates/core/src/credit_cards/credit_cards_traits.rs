use crate::credit_cards::credit_cards_model::{CardUtilization, CreditCard, NextBilling};
use crate::errors::Result;
use crate::recurring::ProcessSummary;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait CreditCardRepositoryTrait: Send + Sync {
    fn get_by_id(&self, credit_card_id: &str) -> Result<Option<CreditCard>>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<CreditCard>>;
    async fn create(&self, card: CreditCard) -> Result<CreditCard>;
}

#[async_trait]
pub trait CreditCardServiceTrait: Send + Sync {
    async fn utilization(&self, credit_card_id: &str, today: NaiveDate) -> Result<CardUtilization>;

    async fn next_billing(&self, credit_card_id: &str, today: NaiveDate) -> Result<NextBilling>;

    /// Writes one aggregate billing entry per card of `owner_id` whose
    /// billing day is `date`. With `preview`, reports without writing.
    async fn bill_due_cards(
        &self,
        owner_id: &str,
        date: NaiveDate,
        preview: bool,
    ) -> Result<ProcessSummary>;
}
