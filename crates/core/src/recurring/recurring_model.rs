//! Charge pass result models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit_cards::CreditCard;
use crate::errors::Error;
use crate::ledger::{LedgerEntry, OccurrenceCharge};
use crate::obligations::Obligation;
use crate::recurring::lease::Lease;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSource {
    Obligation,
    CreditCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemOutcome {
    /// A ledger entry was written.
    Created,
    /// Preview only: the entry that would be written.
    WouldCreate,
    /// An entry already exists for this date.
    Skipped,
    /// Another invocation holds the lease; retried on the next pass.
    Deferred,
    Failed,
}

/// Per-candidate detail of a charge or billing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedItem {
    pub source: ItemSource,
    pub source_id: String,
    pub name: String,
    pub outcome: ItemOutcome,
    pub date: NaiveDate,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub occurrence_number: Option<u32>,
    pub entry_id: Option<String>,
    pub message: Option<String>,
}

impl ProcessedItem {
    fn for_obligation(obligation: &Obligation, date: NaiveDate, outcome: ItemOutcome) -> Self {
        Self {
            source: ItemSource::Obligation,
            source_id: obligation.id.clone(),
            name: obligation.name.clone(),
            outcome,
            date,
            amount: None,
            currency: None,
            occurrence_number: None,
            entry_id: None,
            message: None,
        }
    }

    pub fn created(obligation: &Obligation, entry: &LedgerEntry) -> Self {
        Self {
            amount: Some(entry.amount),
            currency: Some(entry.currency.clone()),
            occurrence_number: entry.occurrence_number,
            entry_id: Some(entry.id.clone()),
            ..Self::for_obligation(obligation, entry.date, ItemOutcome::Created)
        }
    }

    pub fn would_create(obligation: &Obligation, charge: &OccurrenceCharge) -> Self {
        Self {
            amount: Some(charge.amount),
            currency: Some(obligation.currency.clone()),
            occurrence_number: charge.occurrence_number,
            ..Self::for_obligation(obligation, charge.date, ItemOutcome::WouldCreate)
        }
    }

    pub fn skipped(obligation: &Obligation, existing: &LedgerEntry) -> Self {
        Self {
            entry_id: Some(existing.id.clone()),
            message: Some("Already materialized for this date".to_string()),
            ..Self::for_obligation(obligation, existing.date, ItemOutcome::Skipped)
        }
    }

    pub fn deferred(obligation: &Obligation, date: NaiveDate) -> Self {
        Self {
            message: Some("Obligation is being charged by another run".to_string()),
            ..Self::for_obligation(obligation, date, ItemOutcome::Deferred)
        }
    }

    /// Stored obligation that could not be read back.
    pub fn unreadable(obligation: &UnreadableObligation, date: NaiveDate) -> Self {
        Self {
            source: ItemSource::Obligation,
            source_id: obligation.id.clone(),
            name: obligation.name.clone(),
            outcome: ItemOutcome::Failed,
            date,
            amount: None,
            currency: None,
            occurrence_number: None,
            entry_id: None,
            message: Some(obligation.error.clone()),
        }
    }

    pub fn failed(obligation: &Obligation, date: NaiveDate, error: &Error) -> Self {
        Self {
            message: Some(error.to_string()),
            ..Self::for_obligation(obligation, date, ItemOutcome::Failed)
        }
    }

    /// Item for a card in the billing pass, with no amount attached yet.
    pub fn for_card(card: &CreditCard, date: NaiveDate, outcome: ItemOutcome) -> Self {
        Self {
            source: ItemSource::CreditCard,
            source_id: card.id.clone(),
            name: card.name.clone(),
            outcome,
            date,
            amount: None,
            currency: None,
            occurrence_number: None,
            entry_id: None,
            message: None,
        }
    }

    pub fn card_billed(card: &CreditCard, entry: &LedgerEntry) -> Self {
        Self {
            amount: Some(entry.amount),
            currency: Some(entry.currency.clone()),
            entry_id: Some(entry.id.clone()),
            ..Self::for_card(card, entry.date, ItemOutcome::Created)
        }
    }

    pub fn card_would_bill(card: &CreditCard, date: NaiveDate, amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            currency: Some(card.currency.clone()),
            ..Self::for_card(card, date, ItemOutcome::WouldCreate)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_amount(mut self, amount: Decimal, currency: &str) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.to_string());
        self
    }
}

/// A stored obligation row whose data does not decode.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableObligation {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Open obligations of an owner as loaded inside a batch, with the rows
/// that could not be read.
#[derive(Debug, Clone, Default)]
pub struct LoadedObligations {
    pub open: Vec<Obligation>,
    pub unreadable: Vec<UnreadableObligation>,
}

impl From<Vec<Obligation>> for LoadedObligations {
    fn from(open: Vec<Obligation>) -> Self {
        Self {
            open,
            unreadable: Vec::new(),
        }
    }
}

/// Counts and detail of one owner's pass for one reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub owner_id: String,
    pub reference_date: NaiveDate,
    pub preview: bool,
    pub created: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub failed: usize,
    pub items: Vec<ProcessedItem>,
}

impl ProcessSummary {
    pub fn new(owner_id: &str, reference_date: NaiveDate, preview: bool) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            reference_date,
            preview,
            created: 0,
            skipped: 0,
            deferred: 0,
            failed: 0,
            items: Vec::new(),
        }
    }

    /// Candidates examined.
    pub fn processed(&self) -> usize {
        self.items.len()
    }

    pub fn record(&mut self, item: ProcessedItem) {
        match item.outcome {
            ItemOutcome::Created | ItemOutcome::WouldCreate => self.created += 1,
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Deferred => self.deferred += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
        self.items.push(item);
    }

    /// Folds another pass for the same owner and date into this one.
    pub fn absorb(&mut self, other: ProcessSummary) {
        for item in other.items {
            self.record(item);
        }
    }

    pub fn created_items(&self) -> impl Iterator<Item = &ProcessedItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Created | ItemOutcome::WouldCreate))
    }
}

/// What a charge batch hands back: the summary and the leases to release
/// once the batch has committed or rolled back.
#[derive(Debug)]
pub struct BatchOutcome {
    pub summary: ProcessSummary,
    pub leases: Vec<Lease>,
}

impl BatchOutcome {
    /// Drops the leases and returns the summary.
    pub fn release(self) -> ProcessSummary {
        drop(self.leases);
        self.summary
    }
}
