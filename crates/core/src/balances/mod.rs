//! Balances module - point-in-time balance snapshots.

mod balances_model;
mod balances_traits;

pub use balances_model::BalanceSnapshot;
pub use balances_traits::BalanceRepositoryTrait;
