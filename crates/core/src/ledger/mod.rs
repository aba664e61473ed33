//! Ledger module - recorded income/expense entries and the writer that
//! materializes obligation occurrences into them.

mod ledger_model;
mod ledger_traits;
mod ledger_writer;

pub use ledger_model::{
    EntrySource, EntryType, LedgerEntry, MaterializedHistory, NewLedgerEntry, OccurrenceLookup,
};
pub use ledger_traits::LedgerRepositoryTrait;
pub use ledger_writer::{ObligationLedgerWriter, OccurrenceCharge};

#[cfg(test)]
mod ledger_writer_tests;
