//! SQLite storage implementation for owners.

mod model;
mod repository;

pub use model::OwnerDB;
pub use repository::OwnerRepository;
