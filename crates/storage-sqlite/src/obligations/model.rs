//! Database models for obligations.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use log::error;

use cashflow_core::obligations::{LoanTerms, Obligation};
use cashflow_core::recurring::UnreadableObligation;

use crate::errors::StorageError;
use crate::utils::{
    date_to_text, decimal_to_text, int_to_u32, text_to_date, text_to_date_opt, text_to_decimal,
    text_to_decimal_opt, text_to_enum,
};

/// Database model for obligations. Loan terms are flattened into nullable
/// `loan_*` columns.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::obligations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ObligationDB {
    pub id: String,
    pub owner_id: String,
    pub kind: String,
    pub name: String,
    pub entry_type: String,
    pub amount: String,
    pub total_amount: Option<String>,
    pub currency: String,
    pub day_of_month: i32,
    pub start_date: String,
    pub end_date: Option<String>,
    pub occurrences_completed: i32,
    pub occurrences_total: Option<i32>,
    pub is_active: bool,
    pub status: String,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub billing_cycle: Option<String>,
    pub loan_principal: Option<String>,
    pub loan_annual_interest_rate: Option<String>,
    pub loan_remaining_balance: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Columns the charge pass advances after materializing an occurrence.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::obligations)]
#[diesel(treat_none_as_null = true)]
pub struct ObligationProgressDB {
    pub occurrences_completed: i32,
    pub status: String,
    pub loan_remaining_balance: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<&Obligation> for ObligationProgressDB {
    fn from(domain: &Obligation) -> Self {
        Self {
            occurrences_completed: domain.occurrences_completed as i32,
            status: domain.status.as_str().to_string(),
            loan_remaining_balance: domain
                .loan
                .as_ref()
                .map(|loan| decimal_to_text(loan.remaining_balance)),
            updated_at: domain.updated_at.naive_utc(),
        }
    }
}

fn loan_terms(db: &ObligationDB) -> Result<Option<LoanTerms>, StorageError> {
    let principal = text_to_decimal_opt("obligations.loan_principal", db.loan_principal.as_deref())?;
    let Some(principal) = principal else {
        return Ok(None);
    };
    let rate = text_to_decimal_opt(
        "obligations.loan_annual_interest_rate",
        db.loan_annual_interest_rate.as_deref(),
    )?;
    let remaining = text_to_decimal_opt(
        "obligations.loan_remaining_balance",
        db.loan_remaining_balance.as_deref(),
    )?;
    Ok(Some(LoanTerms {
        principal,
        annual_interest_rate: rate.unwrap_or_default(),
        remaining_balance: remaining.unwrap_or(principal),
    }))
}

impl TryFrom<ObligationDB> for Obligation {
    type Error = StorageError;

    fn try_from(db: ObligationDB) -> Result<Self, Self::Error> {
        let loan = loan_terms(&db)?;
        Ok(Self {
            kind: text_to_enum("obligations.kind", &db.kind)?,
            entry_type: text_to_enum("obligations.entry_type", &db.entry_type)?,
            amount: text_to_decimal("obligations.amount", &db.amount)?,
            total_amount: text_to_decimal_opt("obligations.total_amount", db.total_amount.as_deref())?,
            day_of_month: int_to_u32("obligations.day_of_month", db.day_of_month)?,
            start_date: text_to_date("obligations.start_date", &db.start_date)?,
            end_date: text_to_date_opt("obligations.end_date", db.end_date.as_deref())?,
            occurrences_completed: int_to_u32(
                "obligations.occurrences_completed",
                db.occurrences_completed,
            )?,
            occurrences_total: db
                .occurrences_total
                .map(|n| int_to_u32("obligations.occurrences_total", n))
                .transpose()?,
            status: text_to_enum("obligations.status", &db.status)?,
            billing_cycle: db
                .billing_cycle
                .as_deref()
                .map(|c| text_to_enum("obligations.billing_cycle", c))
                .transpose()?,
            loan,
            updated_at: db.updated_at.and_utc(),
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            currency: db.currency,
            is_active: db.is_active,
            category_id: db.category_id,
            account_id: db.account_id,
            credit_card_id: db.credit_card_id,
        })
    }
}

impl From<&Obligation> for ObligationDB {
    fn from(domain: &Obligation) -> Self {
        let loan = domain.loan.as_ref();
        Self {
            id: domain.id.clone(),
            owner_id: domain.owner_id.clone(),
            kind: domain.kind.as_str().to_string(),
            name: domain.name.clone(),
            entry_type: domain.entry_type.as_str().to_string(),
            amount: decimal_to_text(domain.amount),
            total_amount: domain.total_amount.map(decimal_to_text),
            currency: domain.currency.clone(),
            day_of_month: domain.day_of_month as i32,
            start_date: date_to_text(domain.start_date),
            end_date: domain.end_date.map(date_to_text),
            occurrences_completed: domain.occurrences_completed as i32,
            occurrences_total: domain.occurrences_total.map(|n| n as i32),
            is_active: domain.is_active,
            status: domain.status.as_str().to_string(),
            category_id: domain.category_id.clone(),
            account_id: domain.account_id.clone(),
            credit_card_id: domain.credit_card_id.clone(),
            billing_cycle: domain.billing_cycle.map(|c| c.as_str().to_string()),
            loan_principal: loan.map(|l| decimal_to_text(l.principal)),
            loan_annual_interest_rate: loan.map(|l| decimal_to_text(l.annual_interest_rate)),
            loan_remaining_balance: loan.map(|l| decimal_to_text(l.remaining_balance)),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Decodes obligation rows. Rows that do not decode are logged and handed
/// back separately.
pub fn split_rows(rows: Vec<ObligationDB>) -> (Vec<Obligation>, Vec<UnreadableObligation>) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut unreadable = Vec::new();
    for row in rows {
        let id = row.id.clone();
        let name = row.name.clone();
        match Obligation::try_from(row) {
            Ok(obligation) => decoded.push(obligation),
            Err(e) => {
                error!("Skipping unreadable obligation {}: {}", id, e);
                unreadable.push(UnreadableObligation {
                    id,
                    name,
                    error: e.to_string(),
                });
            }
        }
    }
    (decoded, unreadable)
}

/// Decodes obligation rows, leaving out rows that do not decode.
pub fn decode_rows(rows: Vec<ObligationDB>) -> Vec<Obligation> {
    split_rows(rows).0
}
