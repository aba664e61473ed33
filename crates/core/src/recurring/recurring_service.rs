//! Per-owner idempotent daily charge pass.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::lease::LeaseRegistry;
use super::recurring_model::{BatchOutcome, ProcessSummary, ProcessedItem};
use super::recurring_traits::{ChargeBatch, ChargeStoreTrait, RecurringChargeServiceTrait};
use crate::errors::Result;
use crate::ledger::{ObligationLedgerWriter, OccurrenceCharge, OccurrenceLookup};
use crate::obligations::{Obligation, ObligationStatus};

/// Materializes due obligation occurrences into ledger entries, exactly once
/// per `(obligation, date)`.
pub struct RecurringChargeProcessor {
    store: Arc<dyn ChargeStoreTrait>,
    leases: Arc<LeaseRegistry>,
}

impl RecurringChargeProcessor {
    pub fn new(store: Arc<dyn ChargeStoreTrait>, leases: Arc<LeaseRegistry>) -> Self {
        Self { store, leases }
    }

    /// Obligations among `open` that the pass charges on `date`.
    pub fn due_candidates(open: Vec<Obligation>, date: NaiveDate) -> Vec<Obligation> {
        open.into_iter()
            .filter(|o| o.kind.is_materialized_daily() && o.is_open() && o.is_due_on(date))
            .collect()
    }

    /// Applies a materialized occurrence to the obligation's progress.
    pub fn advance_progress(obligation: &Obligation, charge: &OccurrenceCharge) -> Obligation {
        let mut updated = obligation.clone();

        if updated.is_bounded() {
            updated.occurrences_completed += 1;
        }
        if let (Some(loan), Some(principal)) = (updated.loan.as_mut(), charge.principal) {
            loan.remaining_balance = (loan.remaining_balance - principal).max(Decimal::ZERO);
        }
        if updated.is_bounded() && updated.is_complete() {
            updated.status = ObligationStatus::Completed;
            if let Some(loan) = updated.loan.as_mut() {
                loan.remaining_balance = Decimal::ZERO;
            }
        }
        updated.updated_at = Utc::now();
        updated
    }

    fn run_pass(
        batch: &mut dyn ChargeBatch,
        leases: &Arc<LeaseRegistry>,
        owner_id: &str,
        date: NaiveDate,
        preview: bool,
    ) -> Result<BatchOutcome> {
        let mut summary = ProcessSummary::new(owner_id, date, preview);
        let mut held = Vec::new();

        let loaded = batch.load_open_obligations(owner_id)?;
        for unreadable in &loaded.unreadable {
            error!(
                "Obligation {} of owner {} cannot be read: {}",
                unreadable.id, owner_id, unreadable.error
            );
            summary.record(ProcessedItem::unreadable(unreadable, date));
        }
        let candidates = Self::due_candidates(loaded.open, date);
        debug!(
            "Owner {}: {} obligation(s) due on {}",
            owner_id,
            candidates.len(),
            date
        );

        for obligation in candidates {
            if preview {
                summary.record(Self::preview_one(batch, &obligation, date));
                continue;
            }

            let Some(lease) = leases.try_acquire(LeaseRegistry::obligation_key(&obligation.id))
            else {
                warn!(
                    "Obligation {} of owner {} is leased by another run; deferring {}",
                    obligation.id, owner_id, date
                );
                summary.record(ProcessedItem::deferred(&obligation, date));
                continue;
            };
            held.push(lease);

            let mut outcome = None;
            let result = batch.savepoint(&mut |b: &mut dyn ChargeBatch| {
                outcome = Some(Self::charge_one(b, &obligation, date)?);
                Ok(())
            });

            match (result, outcome) {
                (Ok(()), Some(item)) => summary.record(item),
                (Ok(()), None) => {}
                (Err(e), _) => {
                    error!(
                        "Failed to charge obligation {} ({}) of owner {} for {}: {}",
                        obligation.id, obligation.kind, owner_id, date, e
                    );
                    summary.record(ProcessedItem::failed(&obligation, date, &e));
                }
            }
        }

        Ok(BatchOutcome {
            summary,
            leases: held,
        })
    }

    /// Idempotency check, pricing, insert and progress update for one
    /// obligation. Runs inside a savepoint.
    fn charge_one(
        batch: &mut dyn ChargeBatch,
        obligation: &Obligation,
        date: NaiveDate,
    ) -> Result<ProcessedItem> {
        if let OccurrenceLookup::Found(existing) = batch.find_occurrence_entry(&obligation.id, date)? {
            debug!(
                "Obligation {} already materialized on {} as entry {}",
                obligation.id, date, existing.id
            );
            return Ok(ProcessedItem::skipped(obligation, &existing));
        }

        let history = batch.materialized_history(&obligation.id)?;
        let charge = ObligationLedgerWriter::compute_charge(obligation, date, Some(history))?;
        let entry = ObligationLedgerWriter::write(batch, obligation, &charge)?;

        let updated = Self::advance_progress(obligation, &charge);
        batch.save_progress(&updated)?;
        if updated.status == ObligationStatus::Completed {
            info!("Obligation {} completed with entry {}", obligation.id, entry.id);
        }

        Ok(ProcessedItem::created(obligation, &entry))
    }

    fn preview_one(batch: &mut dyn ChargeBatch, obligation: &Obligation, date: NaiveDate) -> ProcessedItem {
        let evaluated = (|| -> Result<ProcessedItem> {
            if let OccurrenceLookup::Found(existing) =
                batch.find_occurrence_entry(&obligation.id, date)?
            {
                return Ok(ProcessedItem::skipped(obligation, &existing));
            }
            let history = batch.materialized_history(&obligation.id)?;
            let charge = ObligationLedgerWriter::compute_charge(obligation, date, Some(history))?;
            Ok(ProcessedItem::would_create(obligation, &charge))
        })();

        evaluated.unwrap_or_else(|e| {
            warn!("Preview of obligation {} for {} failed: {}", obligation.id, date, e);
            ProcessedItem::failed(obligation, date, &e)
        })
    }
}

#[async_trait]
impl RecurringChargeServiceTrait for RecurringChargeProcessor {
    async fn process(
        &self,
        owner_id: &str,
        reference_date: NaiveDate,
        preview: bool,
    ) -> Result<ProcessSummary> {
        let owner = owner_id.to_string();
        let leases = Arc::clone(&self.leases);

        let outcome = self
            .store
            .run_batch(Box::new(move |batch: &mut dyn ChargeBatch| {
                Self::run_pass(batch, &leases, &owner, reference_date, preview)
            }))
            .await
            .inspect_err(|e| {
                error!(
                    "Charge pass for owner {} on {} rolled back: {}",
                    owner_id, reference_date, e
                )
            })?;

        let summary = outcome.release();
        info!(
            "Charge pass owner={} date={} preview={}: created={} skipped={} deferred={} failed={}",
            summary.owner_id,
            summary.reference_date,
            summary.preview,
            summary.created,
            summary.skipped,
            summary.deferred,
            summary.failed
        );
        Ok(summary)
    }
}
