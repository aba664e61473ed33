//! Credit card domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_BILLING_DAY;
use crate::errors::{Result, ValidationError};
use crate::obligations::ObligationKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub credit_limit: Decimal,
    /// Day of month the statement is charged, 1-28.
    pub billing_day: u32,
    pub currency: String,
    /// Bank account the monthly statement is paid from.
    pub linked_account_id: Option<String>,
    pub is_active: bool,
}

impl CreditCard {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BILLING_DAY).contains(&self.billing_day) {
            return Err(ValidationError::InvalidInput(format!(
                "Credit card {}: billing_day {} outside 1-{}",
                self.id, self.billing_day, MAX_BILLING_DAY
            ))
            .into());
        }
        if self.credit_limit < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "Credit card {}: negative credit limit",
                self.id
            ))
            .into());
        }
        Ok(())
    }
}

/// Number of linked obligations counted, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeCounts {
    pub installments: usize,
    pub fixed_expenses: usize,
    pub subscriptions: usize,
}

impl ChargeCounts {
    pub fn count(&mut self, kind: ObligationKind) {
        match kind {
            ObligationKind::Installment => self.installments += 1,
            ObligationKind::FixedItem => self.fixed_expenses += 1,
            ObligationKind::Subscription => self.subscriptions += 1,
            ObligationKind::Loan => {}
        }
    }

    pub fn total(&self) -> usize {
        self.installments + self.fixed_expenses + self.subscriptions
    }
}

/// One obligation's contribution to a card, in the card currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCharge {
    pub obligation_id: String,
    pub name: String,
    pub kind: ObligationKind,
    pub amount: Decimal,
    pub original_amount: Decimal,
    pub original_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUtilization {
    pub credit_card_id: String,
    pub currency: String,
    pub credit_limit: Decimal,
    /// Monthly-equivalent sum of every linked charge.
    pub total_monthly_charges: Decimal,
    pub utilization_percentage: Decimal,
    pub available_credit: Decimal,
    pub counts_by_source_type: ChargeCounts,
    pub charges: Vec<CardCharge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBilling {
    pub credit_card_id: String,
    pub currency: String,
    pub billing_date: NaiveDate,
    pub charges: Vec<CardCharge>,
    pub total_charge: Decimal,
    pub remaining_after_charge: Decimal,
}
