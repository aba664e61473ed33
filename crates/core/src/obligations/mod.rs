//! Obligations module - loans, installment plans, fixed items and subscriptions.

mod obligations_model;
mod obligations_traits;

pub use obligations_model::{
    BillingCycle, LoanTerms, Obligation, ObligationKind, ObligationStatus,
};
pub use obligations_traits::ObligationRepositoryTrait;

#[cfg(test)]
mod obligations_model_tests;
