//! Scheduler module - the daily timer, its per-owner job queue and the
//! manual trigger surface.

mod scheduler_model;
mod scheduler_service;
pub mod timer;

pub use scheduler_model::{
    OwnerFailure, OwnerJob, RunSummary, RunTrigger, SchedulerConfig, SchedulerStatus,
};
pub use scheduler_service::{SchedulerOrchestrator, SchedulerServiceTrait};

#[cfg(test)]
mod scheduler_service_tests;
