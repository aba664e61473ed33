//! SQLite implementation of the guarded charge batch.

mod charge_store;

pub use charge_store::SqliteChargeStore;
