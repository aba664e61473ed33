//! SQLite storage implementation for the cash-flow engine.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `cashflow-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - The guarded charge batch used by the daily charge and billing passes
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! Every write goes through the single writer actor ([`WriteHandle`]);
//! reads use pooled connections.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod balances;
pub mod budgets;
pub mod credit_cards;
pub mod expected_incomes;
pub mod ledger;
pub mod obligations;
pub mod owners;
pub mod recurring;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use balances::BalanceRepository;
pub use budgets::BudgetRepository;
pub use credit_cards::CreditCardRepository;
pub use expected_incomes::ExpectedIncomeRepository;
pub use ledger::LedgerRepository;
pub use obligations::ObligationRepository;
pub use owners::OwnerRepository;
pub use recurring::SqliteChargeStore;

// Re-export from cashflow-core for convenience
pub use cashflow_core::errors::{DatabaseError, Error, Result};
