//! SQLite storage implementation for balance snapshots.

mod model;
mod repository;

pub use model::BalanceSnapshotDB;
pub use repository::BalanceRepository;
