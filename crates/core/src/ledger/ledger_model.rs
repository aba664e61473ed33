//! Ledger entry domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }

    /// Sign applied to an amount when it moves a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            EntryType::Income => amount,
            EntryType::Expense => -amount,
        }
    }
}

impl FromStr for EntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INCOME" => Ok(EntryType::Income),
            "EXPENSE" => Ok(EntryType::Expense),
            other => Err(ValidationError::InvalidInput(format!("Unknown entry type '{}'", other)).into()),
        }
    }
}

/// What created a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntrySource {
    Manual,
    Obligation,
    CardBilling,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Manual => "MANUAL",
            EntrySource::Obligation => "OBLIGATION",
            EntrySource::CardBilling => "CARD_BILLING",
        }
    }
}

impl FromStr for EntrySource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MANUAL" => Ok(EntrySource::Manual),
            "OBLIGATION" => Ok(EntrySource::Obligation),
            "CARD_BILLING" => Ok(EntrySource::CardBilling),
            other => Err(ValidationError::InvalidInput(format!("Unknown entry source '{}'", other)).into()),
        }
    }
}

/// A recorded money movement. Immutable once created apart from its
/// category and description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub owner_id: String,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub description: Option<String>,
    pub obligation_id: Option<String>,
    pub occurrence_number: Option<u32>,
    pub is_recurring: bool,
    pub source: EntrySource,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn signed_amount(&self) -> Decimal {
        self.entry_type.signed(self.amount)
    }
}

/// Fields of a ledger entry about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEntry {
    pub id: Option<String>,
    pub owner_id: String,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub description: Option<String>,
    pub obligation_id: Option<String>,
    pub occurrence_number: Option<u32>,
    pub is_recurring: bool,
    pub source: EntrySource,
}

impl NewLedgerEntry {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Ledger entry amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField("owner_id".to_string()).into());
        }
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingField("currency".to_string()).into());
        }
        Ok(())
    }

    /// Materializes the entry with the given id and creation time.
    pub fn into_entry(self, id: String, created_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id,
            owner_id: self.owner_id,
            entry_type: self.entry_type,
            amount: self.amount,
            currency: self.currency,
            date: self.date,
            category_id: self.category_id,
            account_id: self.account_id,
            credit_card_id: self.credit_card_id,
            description: self.description,
            obligation_id: self.obligation_id,
            occurrence_number: self.occurrence_number,
            is_recurring: self.is_recurring,
            source: self.source,
            created_at,
        }
    }
}

/// Result of looking up the entry materialized for one occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum OccurrenceLookup {
    Found(LedgerEntry),
    NotFound,
}

impl OccurrenceLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, OccurrenceLookup::Found(_))
    }
}

impl From<Option<LedgerEntry>> for OccurrenceLookup {
    fn from(entry: Option<LedgerEntry>) -> Self {
        match entry {
            Some(entry) => OccurrenceLookup::Found(entry),
            None => OccurrenceLookup::NotFound,
        }
    }
}

/// Entries already materialized for one obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterializedHistory {
    pub count: u32,
    pub total: Decimal,
}
