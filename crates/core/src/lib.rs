//! Cashflow Core - Domain entities, services, and traits.
//!
//! This crate contains the recurring obligation scheduler and the forecast
//! engine. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod balances;
pub mod budgets;
pub mod constants;
pub mod credit_cards;
pub mod errors;
pub mod forecast;
pub mod fx;
pub mod ledger;
pub mod obligations;
pub mod owners;
pub mod recurring;
pub mod scheduler;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
