//! SQLite storage implementation for ledger entries.

mod model;
mod repository;

pub use model::{decode_entries, LedgerEntryDB};
pub use repository::LedgerRepository;
pub(crate) use repository::insert_entry;
