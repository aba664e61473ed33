use crate::errors::Result;
use crate::owners::owners_model::Owner;
use async_trait::async_trait;

/// Read access to owners; owner management is an external collaborator.
#[async_trait]
pub trait OwnerRepositoryTrait: Send + Sync {
    fn get_by_id(&self, owner_id: &str) -> Result<Option<Owner>>;
    fn list_active(&self) -> Result<Vec<Owner>>;
    async fn create(&self, owner: Owner) -> Result<Owner>;
}
