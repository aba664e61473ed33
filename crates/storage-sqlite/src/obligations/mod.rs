//! SQLite storage implementation for obligations.

mod model;
mod repository;

pub use model::{decode_rows, split_rows, ObligationDB, ObligationProgressDB};
pub use repository::ObligationRepository;
