use crate::errors::Result;
use crate::obligations::obligations_model::Obligation;
use async_trait::async_trait;

/// Read access to obligations, plus the single insert used when seeding.
///
/// Obligation CRUD belongs to an external collaborator; the charge pass
/// advances progress through [`crate::recurring::ChargeBatch`] instead.
#[async_trait]
pub trait ObligationRepositoryTrait: Send + Sync {
    fn get_by_id(&self, obligation_id: &str) -> Result<Option<Obligation>>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Obligation>>;
    fn list_by_credit_card(&self, credit_card_id: &str) -> Result<Vec<Obligation>>;
    async fn create(&self, obligation: Obligation) -> Result<Obligation>;
}
