//! Recurring charges - the per-owner daily pass that materializes due
//! obligation occurrences, guarded by row leases and idempotency checks.

mod lease;
mod recurring_model;
mod recurring_service;
mod recurring_traits;

pub use lease::{Lease, LeaseRegistry};
pub use recurring_model::{
    BatchOutcome, ItemOutcome, ItemSource, LoadedObligations, ProcessSummary, ProcessedItem,
    UnreadableObligation,
};
pub use recurring_service::RecurringChargeProcessor;
pub use recurring_traits::{BatchJob, ChargeBatch, ChargeStoreTrait, RecurringChargeServiceTrait};
