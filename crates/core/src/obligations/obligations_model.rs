//! Obligation domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DECIMAL_PRECISION, MONEY_PRECISION};
use crate::errors::{Error, Result, ValidationError};
use crate::ledger::EntryType;
use crate::utils::time_utils::{clamp_day_in_month, is_due_on, months_between};

/// The variants of a recurring financial commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationKind {
    Loan,
    Installment,
    FixedItem,
    Subscription,
}

impl ObligationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationKind::Loan => "LOAN",
            ObligationKind::Installment => "INSTALLMENT",
            ObligationKind::FixedItem => "FIXED_ITEM",
            ObligationKind::Subscription => "SUBSCRIPTION",
        }
    }

    /// Loans and installment plans end after a fixed number of occurrences.
    pub fn is_bounded(&self) -> bool {
        matches!(self, ObligationKind::Loan | ObligationKind::Installment)
    }

    /// Kinds the daily charge pass turns into ledger entries.
    /// Subscriptions are billed through their credit card instead.
    pub fn is_materialized_daily(&self) -> bool {
        !matches!(self, ObligationKind::Subscription)
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObligationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOAN" => Ok(ObligationKind::Loan),
            "INSTALLMENT" => Ok(ObligationKind::Installment),
            "FIXED_ITEM" => Ok(ObligationKind::FixedItem),
            "SUBSCRIPTION" => Ok(ObligationKind::Subscription),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown obligation kind '{}'",
                other
            ))
            .into()),
        }
    }
}

/// How often a subscription bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "MONTHLY",
            BillingCycle::Quarterly => "QUARTERLY",
            BillingCycle::SemiAnnual => "SEMI_ANNUAL",
            BillingCycle::Annual => "ANNUAL",
        }
    }

    /// Length of one billing cycle in months.
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::SemiAnnual => 6,
            BillingCycle::Annual => 12,
        }
    }

    /// Factor turning one cycle's amount into its average monthly contribution:
    /// monthly 1, quarterly 1/3, semi-annual 1/6, annual 1/12.
    pub fn monthly_factor(&self) -> Decimal {
        Decimal::ONE / Decimal::from(self.months())
    }

    /// Average monthly contribution of `amount` billed once per cycle.
    pub fn monthly_equivalent(&self, amount: Decimal) -> Decimal {
        (amount / Decimal::from(self.months())).round_dp(DECIMAL_PRECISION)
    }
}

impl FromStr for BillingCycle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MONTHLY" => Ok(BillingCycle::Monthly),
            "QUARTERLY" => Ok(BillingCycle::Quarterly),
            "SEMI_ANNUAL" => Ok(BillingCycle::SemiAnnual),
            "ANNUAL" => Ok(BillingCycle::Annual),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown billing cycle '{}'",
                other
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationStatus {
    Active,
    Completed,
}

impl ObligationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObligationStatus::Active => "ACTIVE",
            ObligationStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for ObligationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(ObligationStatus::Active),
            "COMPLETED" => Ok(ObligationStatus::Completed),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown obligation status '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Amortization state of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Yearly rate as a fraction (0.06 for 6%).
    pub annual_interest_rate: Decimal,
    pub remaining_balance: Decimal,
}

impl LoanTerms {
    pub fn has_interest(&self) -> bool {
        self.annual_interest_rate > Decimal::ZERO
    }

    /// Interest accrued on the remaining balance over one monthly period.
    pub fn monthly_interest(&self) -> Decimal {
        (self.remaining_balance * self.annual_interest_rate / Decimal::from(12))
            .round_dp(MONEY_PRECISION)
    }
}

/// A recurring financial commitment with a day-of-month due rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    pub id: String,
    pub owner_id: String,
    pub kind: ObligationKind,
    pub name: String,
    /// Income or expense. Only fixed items may be income.
    pub entry_type: EntryType,
    /// Amount charged per occurrence (per billing cycle for subscriptions).
    pub amount: Decimal,
    /// Full amount of a bounded plan; the final occurrence absorbs rounding.
    pub total_amount: Option<Decimal>,
    pub currency: String,
    pub day_of_month: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub occurrences_completed: u32,
    pub occurrences_total: Option<u32>,
    pub is_active: bool,
    pub status: ObligationStatus,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub loan: Option<LoanTerms>,
    pub updated_at: DateTime<Utc>,
}

impl Obligation {
    /// Per-occurrence amount of a plan splitting `total` over `occurrences`,
    /// rounded to cents. The last occurrence later absorbs the remainder.
    pub fn per_occurrence_from_total(total: Decimal, occurrences: u32) -> Decimal {
        if occurrences == 0 {
            return total;
        }
        (total / Decimal::from(occurrences)).round_dp(MONEY_PRECISION)
    }

    pub fn is_bounded(&self) -> bool {
        self.kind.is_bounded()
    }

    pub fn remaining_occurrences(&self) -> Option<u32> {
        self.occurrences_total
            .map(|total| total.saturating_sub(self.occurrences_completed))
    }

    /// Bounded plans are complete once every occurrence is materialized or the
    /// loan balance is gone. Open-ended items never complete.
    pub fn is_complete(&self) -> bool {
        if self.status == ObligationStatus::Completed {
            return true;
        }
        if !self.is_bounded() {
            return false;
        }
        let payments_done = self
            .occurrences_total
            .is_some_and(|total| self.occurrences_completed >= total);
        let balance_gone = self
            .loan
            .as_ref()
            .is_some_and(|loan| loan.remaining_balance <= Decimal::ZERO);
        payments_done || balance_gone
    }

    /// Active and not yet complete.
    pub fn is_open(&self) -> bool {
        self.is_active && !self.is_complete()
    }

    pub fn next_occurrence_number(&self) -> u32 {
        self.occurrences_completed + 1
    }

    pub fn is_final_occurrence(&self, occurrence_number: u32) -> bool {
        self.occurrences_total
            .is_some_and(|total| occurrence_number >= total)
    }

    /// Whether `date` falls inside the obligation's start/end window.
    pub fn is_in_effect_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Whether the day-of-month rule lands on `date` inside the active window.
    /// Subscriptions additionally require `date` to fall in a billing month.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        if !self.is_in_effect_on(date) || !is_due_on(self.day_of_month, date) {
            return false;
        }
        match (self.kind, self.billing_cycle) {
            (ObligationKind::Subscription, Some(cycle)) => self.bills_in_month_of(cycle, date),
            _ => true,
        }
    }

    /// Whether the billing cycle, counted from the start month, bills in the
    /// month containing `date`.
    fn bills_in_month_of(&self, cycle: BillingCycle, date: NaiveDate) -> bool {
        let elapsed = months_between(self.start_date, date);
        elapsed >= 0 && elapsed % cycle.months() as i32 == 0
    }

    /// Due date of this obligation in the month containing `anchor`.
    pub fn due_date_in_month(&self, anchor: NaiveDate) -> NaiveDate {
        clamp_day_in_month(anchor, self.day_of_month)
    }

    /// Average monthly contribution of this obligation.
    pub fn monthly_equivalent(&self) -> Decimal {
        match (self.kind, self.billing_cycle) {
            (ObligationKind::Subscription, Some(cycle)) => cycle.monthly_equivalent(self.amount),
            _ => self.amount,
        }
    }

    /// Rejects malformed obligation data before any amount is derived from it.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> {
            Err(ValidationError::InvalidInput(format!("Obligation {}: {}", self.id, msg)).into())
        };

        if !(1..=31).contains(&self.day_of_month) {
            return invalid(format!("day_of_month {} outside 1-31", self.day_of_month));
        }
        if self.amount <= Decimal::ZERO {
            return invalid(format!("amount {} must be positive", self.amount));
        }
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingField("currency".to_string()).into());
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return invalid(format!("end_date {} before start_date {}", end, self.start_date));
            }
        }
        if self.kind != ObligationKind::FixedItem && self.entry_type != EntryType::Expense {
            return invalid(format!("{} obligations must be expenses", self.kind));
        }

        match self.kind {
            ObligationKind::Loan | ObligationKind::Installment => {
                let Some(total) = self.occurrences_total else {
                    return Err(ValidationError::MissingField("occurrences_total".to_string()).into());
                };
                if total == 0 {
                    return invalid("occurrences_total must be at least 1".to_string());
                }
                if self.occurrences_completed > total {
                    return invalid(format!(
                        "occurrences_completed {} exceeds occurrences_total {}",
                        self.occurrences_completed, total
                    ));
                }
                if self.kind == ObligationKind::Loan && self.loan.is_none() {
                    return Err(ValidationError::MissingField("loan".to_string()).into());
                }
            }
            ObligationKind::Subscription => {
                if self.billing_cycle.is_none() {
                    return Err(ValidationError::MissingField("billing_cycle".to_string()).into());
                }
            }
            ObligationKind::FixedItem => {}
        }

        Ok(())
    }
}
