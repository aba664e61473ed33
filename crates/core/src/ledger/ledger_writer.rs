//! Turns one obligation occurrence into ledger entry fields.
//!
//! The writer never decides whether an occurrence is due; the charge pass
//! does that and hands the writer a single occurrence to price and insert.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::MONEY_PRECISION;
use crate::errors::{Result, ValidationError};
use crate::ledger::ledger_model::{
    EntrySource, LedgerEntry, MaterializedHistory, NewLedgerEntry,
};
use crate::obligations::Obligation;
use crate::recurring::ChargeBatch;

/// The priced occurrence of an obligation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceCharge {
    pub obligation_id: String,
    pub date: NaiveDate,
    /// 1-based position in a bounded plan; `None` for open-ended items.
    pub occurrence_number: Option<u32>,
    pub amount: Decimal,
    pub is_final: bool,
    /// Interest portion of a loan payment.
    pub interest: Option<Decimal>,
    /// Principal portion of a loan payment.
    pub principal: Option<Decimal>,
}

pub struct ObligationLedgerWriter;

impl ObligationLedgerWriter {
    /// Prices the next occurrence of `obligation` falling on `date`.
    ///
    /// `history` is what has already been materialized for the obligation.
    /// When it accounts for every completed occurrence, the final occurrence
    /// is priced against the amounts actually charged; otherwise it falls
    /// back to `per_occurrence × (n − 1)`.
    pub fn compute_charge(
        obligation: &Obligation,
        date: NaiveDate,
        history: Option<MaterializedHistory>,
    ) -> Result<OccurrenceCharge> {
        obligation.validate()?;

        if !obligation.is_bounded() {
            return Ok(OccurrenceCharge {
                obligation_id: obligation.id.clone(),
                date,
                occurrence_number: None,
                amount: obligation.amount,
                is_final: false,
                interest: None,
                principal: None,
            });
        }

        let occurrence_number = obligation.next_occurrence_number();
        let total_occurrences = obligation.occurrences_total.unwrap_or(occurrence_number);
        if occurrence_number > total_occurrences {
            return Err(ValidationError::InvalidInput(format!(
                "Obligation {} already completed {} of {} occurrences",
                obligation.id, obligation.occurrences_completed, total_occurrences
            ))
            .into());
        }
        let is_final = obligation.is_final_occurrence(occurrence_number);

        if let Some(loan) = obligation.loan.as_ref().filter(|l| l.has_interest()) {
            let interest = loan.monthly_interest();
            let payoff = (loan.remaining_balance + interest).round_dp(MONEY_PRECISION);
            let amount = if is_final || obligation.amount >= payoff {
                payoff
            } else {
                obligation.amount
            };
            return Ok(OccurrenceCharge {
                obligation_id: obligation.id.clone(),
                date,
                occurrence_number: Some(occurrence_number),
                amount,
                is_final: is_final || amount == payoff,
                interest: Some(interest),
                principal: Some(amount - interest),
            });
        }

        let amount = if is_final {
            Self::final_amount(obligation, occurrence_number, history)?
        } else {
            obligation.amount
        };
        let principal = obligation.loan.as_ref().map(|_| amount);

        Ok(OccurrenceCharge {
            obligation_id: obligation.id.clone(),
            date,
            occurrence_number: Some(occurrence_number),
            amount,
            is_final,
            interest: principal.map(|_| Decimal::ZERO),
            principal,
        })
    }

    /// Amount of the last occurrence: whatever is left of the plan total, so
    /// the occurrences sum to the total exactly.
    fn final_amount(
        obligation: &Obligation,
        occurrence_number: u32,
        history: Option<MaterializedHistory>,
    ) -> Result<Decimal> {
        let total = obligation
            .total_amount
            .or_else(|| obligation.loan.as_ref().map(|l| l.principal))
            .ok_or_else(|| ValidationError::MissingField("total_amount".to_string()))?;

        let prior = occurrence_number - 1;
        let already_charged = match history {
            Some(h) if h.count == prior => h.total,
            _ => obligation.amount * Decimal::from(prior),
        };

        let remainder = (total - already_charged).round_dp(MONEY_PRECISION);
        if remainder <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Obligation {}: prior occurrences ({}) already cover the total {}",
                obligation.id, already_charged, total
            ))
            .into());
        }
        Ok(remainder)
    }

    /// Ledger entry fields for a priced occurrence.
    pub fn entry_for(obligation: &Obligation, charge: &OccurrenceCharge) -> NewLedgerEntry {
        let description = match (charge.occurrence_number, obligation.occurrences_total) {
            (Some(n), Some(total)) => format!("{} ({}/{})", obligation.name, n, total),
            _ => obligation.name.clone(),
        };

        NewLedgerEntry {
            id: None,
            owner_id: obligation.owner_id.clone(),
            entry_type: obligation.entry_type,
            amount: charge.amount,
            currency: obligation.currency.clone(),
            date: charge.date,
            category_id: obligation.category_id.clone(),
            account_id: obligation.account_id.clone(),
            credit_card_id: obligation.credit_card_id.clone(),
            description: Some(description),
            obligation_id: Some(obligation.id.clone()),
            occurrence_number: charge.occurrence_number,
            is_recurring: true,
            source: EntrySource::Obligation,
        }
    }

    /// Inserts the entry for a priced occurrence. The only side effect.
    pub fn write(
        batch: &mut dyn ChargeBatch,
        obligation: &Obligation,
        charge: &OccurrenceCharge,
    ) -> Result<LedgerEntry> {
        let entry = Self::entry_for(obligation, charge);
        entry.validate()?;
        batch.insert_entry(entry)
    }
}
