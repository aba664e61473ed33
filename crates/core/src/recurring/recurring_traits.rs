use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::ledger::{LedgerEntry, MaterializedHistory, NewLedgerEntry, OccurrenceLookup};
use crate::obligations::Obligation;
use crate::recurring::recurring_model::{BatchOutcome, LoadedObligations, ProcessSummary};

/// Operations available inside one guarded, all-or-nothing charge batch.
///
/// Everything read through a batch is read under the batch's write lock, so
/// a concurrent batch cannot interleave between the idempotency check and
/// the insert that follows it.
pub trait ChargeBatch {
    /// Active, not yet completed obligations of the owner. Rows that fail to
    /// decode come back as unreadable rather than failing the load.
    fn load_open_obligations(&mut self, owner_id: &str) -> Result<LoadedObligations>;

    /// The entry already materialized for `(obligation, date)`, if any.
    fn find_occurrence_entry(
        &mut self,
        obligation_id: &str,
        date: NaiveDate,
    ) -> Result<OccurrenceLookup>;

    /// Count and sum of the entries materialized for an obligation so far.
    fn materialized_history(&mut self, obligation_id: &str) -> Result<MaterializedHistory>;

    fn insert_entry(&mut self, entry: NewLedgerEntry) -> Result<LedgerEntry>;

    /// Persists occurrence progress, loan balance and completion status.
    fn save_progress(&mut self, obligation: &Obligation) -> Result<()>;

    /// The aggregate billing entry already written for `(card, date)`, if any.
    fn find_card_billing_entry(
        &mut self,
        credit_card_id: &str,
        date: NaiveDate,
    ) -> Result<OccurrenceLookup>;

    /// Runs `work` in a nested savepoint: an error rolls back only what
    /// `work` wrote and is returned to the caller.
    fn savepoint(&mut self, work: &mut dyn FnMut(&mut dyn ChargeBatch) -> Result<()>) -> Result<()>;
}

/// A unit of work executed inside one charge batch.
pub type BatchJob = Box<dyn FnOnce(&mut dyn ChargeBatch) -> Result<BatchOutcome> + Send + 'static>;

/// Persistence collaborator for the write path of the charge passes.
#[async_trait]
pub trait ChargeStoreTrait: Send + Sync {
    /// Executes `job` as one transaction. An `Err` from the job, or a failed
    /// commit, discards everything the job wrote.
    async fn run_batch(&self, job: BatchJob) -> Result<BatchOutcome>;
}

/// Trait for the per-owner daily charge pass.
#[async_trait]
pub trait RecurringChargeServiceTrait: Send + Sync {
    /// Materializes every obligation of `owner_id` due on `reference_date`.
    /// With `preview`, reports the would-be entries without writing.
    async fn process(
        &self,
        owner_id: &str,
        reference_date: NaiveDate,
        preview: bool,
    ) -> Result<ProcessSummary>;

    async fn preview(&self, owner_id: &str, reference_date: NaiveDate) -> Result<ProcessSummary> {
        self.process(owner_id, reference_date, true).await
    }
}
