//! Credit cards module - utilization, upcoming statements and the daily
//! billing pass that records one aggregate entry per card.

mod credit_cards_model;
mod credit_cards_service;
mod credit_cards_traits;

pub use credit_cards_model::{CardCharge, CardUtilization, ChargeCounts, CreditCard, NextBilling};
pub use credit_cards_service::CreditCardBillingAggregator;
pub use credit_cards_traits::{CreditCardRepositoryTrait, CreditCardServiceTrait};
