//! Owners module - the scope every obligation, entry and projection belongs to.

mod owners_model;
mod owners_traits;

pub use owners_model::Owner;
pub use owners_traits::OwnerRepositoryTrait;
