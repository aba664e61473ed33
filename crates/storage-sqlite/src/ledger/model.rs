//! Database model for ledger entries.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use cashflow_core::ledger::LedgerEntry;

use crate::errors::StorageError;
use crate::utils::{date_to_text, decimal_to_text, int_to_u32, text_to_date, text_to_decimal, text_to_enum};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub id: String,
    pub owner_id: String,
    pub entry_type: String,
    pub amount: String,
    pub currency: String,
    pub date: String,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub description: Option<String>,
    pub obligation_id: Option<String>,
    pub occurrence_number: Option<i32>,
    pub is_recurring: bool,
    pub source: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<LedgerEntryDB> for LedgerEntry {
    type Error = StorageError;

    fn try_from(db: LedgerEntryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_type: text_to_enum("ledger_entries.entry_type", &db.entry_type)?,
            amount: text_to_decimal("ledger_entries.amount", &db.amount)?,
            date: text_to_date("ledger_entries.date", &db.date)?,
            occurrence_number: db
                .occurrence_number
                .map(|n| int_to_u32("ledger_entries.occurrence_number", n))
                .transpose()?,
            source: text_to_enum("ledger_entries.source", &db.source)?,
            created_at: db.created_at.and_utc(),
            id: db.id,
            owner_id: db.owner_id,
            currency: db.currency,
            category_id: db.category_id,
            account_id: db.account_id,
            credit_card_id: db.credit_card_id,
            description: db.description,
            obligation_id: db.obligation_id,
            is_recurring: db.is_recurring,
        })
    }
}

impl From<&LedgerEntry> for LedgerEntryDB {
    fn from(domain: &LedgerEntry) -> Self {
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            entry_type: domain.entry_type.as_str().to_string(),
            amount: decimal_to_text(domain.amount),
            currency: domain.currency.clone(),
            date: date_to_text(domain.date),
            category_id: domain.category_id.clone(),
            account_id: domain.account_id.clone(),
            credit_card_id: domain.credit_card_id.clone(),
            description: domain.description.clone(),
            obligation_id: domain.obligation_id.clone(),
            occurrence_number: domain.occurrence_number.map(|n| n as i32),
            is_recurring: domain.is_recurring,
            source: domain.source.as_str().to_string(),
            created_at: domain.created_at.naive_utc(),
        }
    }
}

/// Decodes entry rows; an undecodable row fails the read.
pub fn decode_entries(rows: Vec<LedgerEntryDB>) -> Result<Vec<LedgerEntry>, StorageError> {
    rows.into_iter().map(LedgerEntry::try_from).collect()
}
