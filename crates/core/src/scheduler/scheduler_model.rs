//! Scheduler configuration, run summaries and status.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::recurring::{ItemOutcome, ItemSource, ProcessSummary};

/// Settings of the daily timer and its worker pool.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub timezone: Tz,
    /// Local wall-clock time of the daily run.
    pub fire_time: NaiveTime,
    /// How late a fire may start and still run instead of being skipped.
    pub misfire_grace: Duration,
    /// Workers draining the per-owner job queue.
    pub workers: usize,
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            fire_time: NaiveTime::from_hms_opt(0, 5, 0).unwrap_or(NaiveTime::MIN),
            misfire_grace: Duration::hours(1),
            workers: 1,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunTrigger {
    Timer,
    Manual,
}

/// One queued unit of work: every pass for one owner on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerJob {
    pub owner_id: String,
    pub reference_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFailure {
    pub owner_id: String,
    pub error: String,
}

/// Totals of one full run across owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub reference_date: NaiveDate,
    pub trigger: RunTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub owners_total: usize,
    pub owners_processed: usize,
    pub owners_failed: usize,
    pub processed: usize,
    pub created: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub failed: usize,
    pub cards_billed: usize,
    pub failures: Vec<OwnerFailure>,
}

impl RunSummary {
    pub fn new(reference_date: NaiveDate, trigger: RunTrigger, started_at: DateTime<Utc>) -> Self {
        Self {
            reference_date,
            trigger,
            started_at,
            finished_at: started_at,
            owners_total: 0,
            owners_processed: 0,
            owners_failed: 0,
            processed: 0,
            created: 0,
            skipped: 0,
            deferred: 0,
            failed: 0,
            cards_billed: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_owner(&mut self, summary: &ProcessSummary) {
        self.owners_processed += 1;
        self.add_counts(summary);
    }

    /// Owner whose later pass failed after `committed` was already written.
    pub fn record_partial_failure(&mut self, owner_id: &str, committed: &ProcessSummary, error: String) {
        self.add_counts(committed);
        self.record_failure(owner_id, error);
    }

    fn add_counts(&mut self, summary: &ProcessSummary) {
        self.processed += summary.processed();
        self.created += summary.created;
        self.skipped += summary.skipped;
        self.deferred += summary.deferred;
        self.failed += summary.failed;
        self.cards_billed += summary
            .items
            .iter()
            .filter(|i| i.source == ItemSource::CreditCard && i.outcome == ItemOutcome::Created)
            .count();
    }

    pub fn record_failure(&mut self, owner_id: &str, error: String) {
        self.owners_failed += 1;
        self.failures.push(OwnerFailure {
            owner_id: owner_id.to_string(),
            error,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    pub enabled: bool,
    pub timezone: String,
    pub fire_time: NaiveTime,
    pub next_run_time: Option<DateTime<Utc>>,
    pub last_run_time: Option<DateTime<Utc>>,
    pub last_run_result: Option<RunSummary>,
}
