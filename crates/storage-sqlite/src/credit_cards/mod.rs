//! SQLite storage implementation for credit cards.

mod model;
mod repository;

pub use model::CreditCardDB;
pub use repository::CreditCardRepository;
