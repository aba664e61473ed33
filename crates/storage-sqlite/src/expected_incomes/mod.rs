//! SQLite storage implementation for expected incomes.

mod model;
mod repository;

pub use model::ExpectedIncomeDB;
pub use repository::ExpectedIncomeRepository;
